use anyhow::{bail, Context, Result};
use chrono::Utc;

use linguaverse_lib::progress::{complete_lesson, CompletedLesson};
use linguaverse_lib::srs::{vocabulary_id, LessonWord};

use crate::app::App;
use crate::OutputFormat;

/// Parse "word|meaning" or "word|meaning|reading"
fn parse_word(entry: &str) -> Result<LessonWord> {
    let parts: Vec<&str> = entry.split('|').map(str::trim).collect();
    match parts.as_slice() {
        [word, meaning] if !word.is_empty() => Ok(LessonWord::new(*word, *meaning, None)),
        [word, meaning, reading] if !word.is_empty() => Ok(LessonWord::new(
            *word,
            *meaning,
            Some(reading.to_string()).filter(|r| !r.is_empty()),
        )),
        _ => bail!("Invalid word '{}'. Expected \"word|meaning\" or \"word|meaning|reading\"", entry),
    }
}

pub fn run(app: &App, lesson_id: &str, words: &[String], xp: u32, format: &OutputFormat) -> Result<()> {
    let vocabulary = words
        .iter()
        .map(|w| parse_word(w))
        .collect::<Result<Vec<_>>>()?;
    let lesson = CompletedLesson {
        lesson_id: lesson_id.to_string(),
        xp_earned: xp,
        vocabulary,
    };
    let policy = app.lesson_policy()?;

    let mut new_words: Vec<&LessonWord> = Vec::new();
    let progress = app
        .storage
        .update_progress(|p| {
            new_words = lesson
                .vocabulary
                .iter()
                .filter(|w| !p.vocabulary.contains_key(&vocabulary_id(&w.word)))
                .collect();
            Ok(complete_lesson(p, &lesson, &policy, Utc::now())?)
        })
        .context("Failed to record lesson")?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "lessonId": lesson.lesson_id,
                "xp": progress.xp,
                "streak": progress.streak,
                "newWords": new_words.iter().map(|w| &w.word).collect::<Vec<_>>(),
                "vocabularyCount": progress.vocabulary.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Completed lesson \"{}\" (+{} XP)", lesson.lesson_id, xp);
            println!(
                "  {} new, {} reviewed, {} words in ledger",
                new_words.len(),
                lesson.vocabulary.len() - new_words.len(),
                progress.vocabulary.len()
            );
            println!("  Streak: {} days", progress.streak);
        }
    }

    Ok(())
}
