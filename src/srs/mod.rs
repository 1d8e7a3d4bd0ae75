//! Spaced repetition scheduling for learned vocabulary
//!
//! This module provides:
//! - Vocabulary items and deterministic word ids
//! - SM-2 grade transitions
//! - Due-item selection and pinned review sessions

pub mod algorithm;
pub mod errors;
pub mod models;
pub mod selection;

pub use algorithm::{
    calculate_next_review, calculate_next_review_at, create_vocab_item, create_vocab_item_at,
    format_interval, vocabulary_id,
};
pub use errors::SrsError;
pub use models::*;
pub use selection::{due_items, select_review_batch, ReviewSession};
