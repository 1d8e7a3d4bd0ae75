//! Scheduler error types

use thiserror::Error;
use uuid::Uuid;

/// Contract violations raised by the scheduling engine
#[derive(Debug, Error)]
pub enum SrsError {
    #[error("Invalid grade {0}: expected a value between 0 and 5")]
    InvalidGrade(i32),

    #[error("Vocabulary item not found: {0}")]
    ItemNotFound(Uuid),

    #[error("Vocabulary id collision on {id}: '{existing}' and '{incoming}'")]
    IdCollision {
        id: Uuid,
        existing: String,
        incoming: String,
    },

    #[error("Item {0} is not part of this review session")]
    NotInSession(Uuid),

    #[error("Item {0} was graded more than once in this review session")]
    DuplicateOutcome(Uuid),

    #[error("Review session {0} is not the one pending for this course")]
    SessionMismatch(Uuid),
}

/// Result type alias for scheduler operations
pub type Result<T> = std::result::Result<T, SrsError>;
