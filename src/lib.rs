//! LinguaVerse vocabulary scheduling
//!
//! Spaced repetition for the words a learner picks up in generated lessons:
//! per-word SM-2 schedules, review batch selection, and the progress record
//! that owns the vocabulary ledger.

pub mod config;
pub mod progress;
pub mod srs;

pub use config::{AppConfig, ConfigError};
pub use progress::{ProgressStorage, ProgressStorageError, UserProgress};
pub use srs::{Grade, ReviewSession, SrsError, VocabularyItem};
