//! Learner progress for the active course
//!
//! This module provides:
//! - The persisted progress record (profile, courses, vocabulary ledger)
//! - Lesson and review completion
//! - File-backed storage with single-writer checks

pub mod lesson;
pub mod models;
pub mod storage;

pub use lesson::{
    complete_lesson, complete_review, effective_streak, lose_heart, next_streak, LessonPolicy,
};
pub use models::*;
pub use storage::{ProgressStorage, ProgressStorageError};
