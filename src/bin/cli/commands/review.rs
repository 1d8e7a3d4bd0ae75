use anyhow::{bail, Context, Result};
use chrono::Utc;

use linguaverse_lib::srs::{vocabulary_id, Grade, ReviewOutcome, ReviewSession};
use uuid::Uuid;

use crate::app::App;
use crate::OutputFormat;

pub fn run_start(app: &App, format: &OutputFormat) -> Result<()> {
    let session = app
        .storage
        .begin_review(app.config.review.batch_size, Utc::now())
        .context("Failed to start review")?;

    let Some(session) = session else {
        match format {
            OutputFormat::Json => println!("null"),
            OutputFormat::Plain => println!("Nothing to review yet. Learn some words first."),
        }
        return Ok(());
    };

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": session.id.to_string(),
                "topic": session.topic(),
                "words": session.words,
                "startedAt": session.started_at.to_rfc3339(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Review started with {} words:", session.words.len());
            for word in &session.words {
                println!("  {}", word);
            }
            println!("\nTopic: {}", session.topic());
        }
    }

    Ok(())
}

/// Normalise `--missed` words the way `learn` normalises taught words
fn missed_words(missed: &[String]) -> Vec<String> {
    missed
        .iter()
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Missed words fail, every other pinned word gets `pass_grade`. Missed words
/// outside the session are kept so the store rejects them.
fn review_outcomes(session: &ReviewSession, missed_ids: &[Uuid], pass_grade: Grade) -> Vec<ReviewOutcome> {
    let mut outcomes: Vec<ReviewOutcome> = session
        .item_ids
        .iter()
        .map(|&item_id| ReviewOutcome {
            item_id,
            grade: if missed_ids.contains(&item_id) {
                Grade::FAIL
            } else {
                pass_grade
            },
        })
        .collect();
    for &item_id in missed_ids {
        if !session.contains(item_id) && !outcomes.iter().any(|o| o.item_id == item_id) {
            outcomes.push(ReviewOutcome { item_id, grade: Grade::FAIL });
        }
    }
    outcomes
}

pub fn run_complete(app: &App, missed: &[String], xp: u32, format: &OutputFormat) -> Result<()> {
    let pass_grade = app.pass_grade()?;
    let policy = app.lesson_policy()?;
    let missed = missed_words(missed);

    let pending = app
        .progress()?
        .pending_review
        .context("No review in progress. Run `linguaverse-cli review start` first.")?;
    let missed_ids: Vec<Uuid> = missed.iter().map(|w| vocabulary_id(w)).collect();
    for (word, id) in missed.iter().zip(&missed_ids) {
        if !pending.contains(*id) {
            bail!("'{}' is not part of the current review", word);
        }
    }

    let mut graded = None;
    let progress = app
        .storage
        .finish_review(
            |session| {
                graded = Some(session.clone());
                review_outcomes(session, &missed_ids, pass_grade)
            },
            xp,
            &policy,
            Utc::now(),
        )
        .context("Failed to complete review")?;
    let reviewed = graded.map(|s| s.words).unwrap_or_default();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "reviewed": reviewed,
                "missed": missed,
                "xp": progress.xp,
                "streak": progress.streak,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "Review complete: {} words, {} missed (+{} XP)",
                reviewed.len(),
                missed.len(),
                xp
            );
            println!("  Streak: {} days", progress.streak);
        }
    }

    Ok(())
}

pub fn run_cancel(app: &App, format: &OutputFormat) -> Result<()> {
    let session = app
        .storage
        .cancel_review()
        .context("Failed to cancel review")?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "cancelled": session.id.to_string() });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Review cancelled ({} words left unchanged)", session.words.len()),
    }

    Ok(())
}
