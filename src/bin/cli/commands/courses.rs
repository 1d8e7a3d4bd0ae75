use anyhow::{Context, Result};

use crate::app::App;
use crate::OutputFormat;

pub fn run_list(app: &App, format: &OutputFormat) -> Result<()> {
    let courses = app
        .storage
        .available_courses()
        .context("Failed to list courses")?;
    let active = app
        .storage
        .get_progress()
        .context("Failed to load progress")?
        .map(|p| p.current_course_id);

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = courses
                .iter()
                .map(|id| {
                    serde_json::json!({
                        "id": id,
                        "isActive": active.as_deref() == Some(id.as_str()),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if courses.is_empty() {
                println!("No courses yet. Start one with `linguaverse-cli use <course>`.");
                return Ok(());
            }
            for id in &courses {
                let marker = if active.as_deref() == Some(id.as_str()) { "* " } else { "  " };
                println!("{}{}", marker, id);
            }
        }
    }

    Ok(())
}

pub fn run_use(app: &App, course: &str, format: &OutputFormat) -> Result<()> {
    let progress = app
        .storage
        .init_course(course)
        .with_context(|| format!("Failed to select course '{}'", course))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "courseId": progress.current_course_id,
                "xp": progress.xp,
                "vocabularyCount": progress.vocabulary.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "Active course: {} ({} XP, {} words)",
                progress.current_course_id,
                progress.xp,
                progress.vocabulary.len()
            );
        }
    }

    Ok(())
}
