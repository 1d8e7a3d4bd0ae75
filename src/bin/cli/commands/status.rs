use anyhow::Result;
use chrono::Utc;

use linguaverse_lib::progress::effective_streak;
use linguaverse_lib::srs::due_items;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let progress = app.progress()?;
    let now = Utc::now();
    let streak = effective_streak(&progress, now);
    let due = due_items(progress.vocabulary.values(), now).len();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "username": progress.username,
                "courseId": progress.current_course_id,
                "hearts": progress.hearts,
                "xp": progress.xp,
                "streak": streak,
                "completedLessons": progress.completed_lessons.len(),
                "vocabularyCount": progress.vocabulary.len(),
                "dueCount": due,
                "reviewInProgress": progress.pending_review.is_some(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{} ({})", progress.username, progress.current_course_id);
            println!("  Hearts:   {}/{}", progress.hearts, app.config.profile.max_hearts);
            println!("  XP:       {}", progress.xp);
            println!("  Streak:   {} days", streak);
            println!("  Lessons:  {}", progress.completed_lessons.len());
            println!("  Words:    {} ({} due)", progress.vocabulary.len(), due);
            if let Some(session) = &progress.pending_review {
                println!("  Review in progress: {} words", session.words.len());
            }
        }
    }

    Ok(())
}
