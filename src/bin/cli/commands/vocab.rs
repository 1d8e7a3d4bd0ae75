use anyhow::Result;
use chrono::Utc;

use linguaverse_lib::srs::{due_items, format_interval, select_review_batch};

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, due_only: bool, format: &OutputFormat) -> Result<()> {
    let progress = app.progress()?;
    let now = Utc::now();

    let items = if due_only {
        due_items(progress.vocabulary.values(), now)
    } else {
        select_review_batch(progress.vocabulary.values(), usize::MAX)
    };

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = items
                .iter()
                .map(|item| {
                    serde_json::json!({
                        "id": item.id.to_string(),
                        "word": item.word,
                        "meaning": item.meaning,
                        "reading": item.reading,
                        "interval": item.interval,
                        "repetition": item.repetition,
                        "easeFactor": item.ease_factor,
                        "nextReview": item.next_review,
                        "isDue": item.is_due_at(now),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if items.is_empty() {
                println!("No vocabulary{}.", if due_only { " due" } else { "" });
                return Ok(());
            }

            let word_width = items.iter().map(|i| i.word.chars().count()).max().unwrap_or(4).clamp(4, 24);

            println!("{:<ww$} {:<8} {:<5} Meaning", "Word", "Due", "Ease", ww = word_width);
            println!("{}", "\u{2500}".repeat(word_width + 30));

            for item in &items {
                let due = format_interval(item.days_until(now));
                let word = match &item.reading {
                    Some(reading) => format!("{} ({})", item.word, reading),
                    None => item.word.clone(),
                };
                println!(
                    "{:<ww$} {:<8} {:<5.2} {}",
                    word,
                    due,
                    item.ease_factor,
                    item.meaning,
                    ww = word_width
                );
            }

            let due_count = items.iter().filter(|i| i.is_due_at(now)).count();
            println!("\n{} words, {} due", items.len(), due_count);
        }
    }

    Ok(())
}
