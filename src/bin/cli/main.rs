mod app;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "linguaverse-cli", about = "LinguaVerse vocabulary and review CLI", version)]
struct Cli {
    /// Config file (default: ~/.config/linguaverse/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory holding the learner's progress
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List started courses
    Courses,

    /// Start or switch to a course
    Use {
        /// Course id (e.g. "japanese")
        course: String,
    },

    /// Complete a lesson that taught new words
    Learn {
        /// Lesson id, recorded as completed
        lesson: String,
        /// Taught word as "word|meaning" or "word|meaning|reading" (repeatable)
        #[arg(long = "word")]
        words: Vec<String>,
        /// XP earned for the lesson
        #[arg(long, default_value = "10")]
        xp: u32,
    },

    /// Review sessions over the vocabulary ledger
    #[command(subcommand)]
    Review(ReviewCommand),

    /// List vocabulary, soonest due first
    Vocab {
        /// Show only items that are due now
        #[arg(long)]
        due: bool,
    },

    /// Show hearts, XP, streak and ledger size
    Status,
}

#[derive(Subcommand)]
enum ReviewCommand {
    /// Pin the next review batch
    Start,

    /// Grade the pinned batch
    Complete {
        /// Word answered incorrectly (repeatable)
        #[arg(long = "missed")]
        missed: Vec<String>,
        /// XP earned for the review
        #[arg(long, default_value = "10")]
        xp: u32,
    },

    /// Drop the pinned batch without grading
    Cancel,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let app = app::App::new(cli.config.as_deref(), cli.data_dir)?;

    match cli.command {
        Command::Courses => commands::courses::run_list(&app, &cli.format)?,
        Command::Use { course } => commands::courses::run_use(&app, &course, &cli.format)?,
        Command::Learn { lesson, words, xp } => {
            commands::learn::run(&app, &lesson, &words, xp, &cli.format)?;
        }
        Command::Review(subcmd) => match subcmd {
            ReviewCommand::Start => commands::review::run_start(&app, &cli.format)?,
            ReviewCommand::Complete { missed, xp } => {
                commands::review::run_complete(&app, &missed, xp, &cli.format)?;
            }
            ReviewCommand::Cancel => commands::review::run_cancel(&app, &cli.format)?,
        },
        Command::Vocab { due } => commands::vocab::run(&app, due, &cli.format)?,
        Command::Status => commands::status::run(&app, &cli.format)?,
    }

    Ok(())
}
