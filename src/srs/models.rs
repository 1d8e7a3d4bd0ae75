//! Data models for the vocabulary scheduler

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{Result, SrsError};

/// Starting ease factor for a freshly learned word
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Hard floor for the ease factor
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Lowest grade that counts as a successful recall
pub const PASS_THRESHOLD: u8 = 3;

/// Highest grade on the SM-2 scale
pub const MAX_GRADE: u8 = 5;

/// Milliseconds in one scheduling day
pub const MS_PER_DAY: i64 = 86_400_000;

/// Number of items pulled into a single review session
pub const DEFAULT_REVIEW_BATCH_SIZE: usize = 10;

/// Recall quality for a single review event (SM-2 scale)
///
/// - 0: Complete blackout, no recall
/// - 1: Incorrect, but remembered once the answer was shown
/// - 2: Incorrect, but the answer seemed easy to recall
/// - 3: Correct with serious difficulty
/// - 4: Correct after hesitation
/// - 5: Perfect recall
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Grade(u8);

impl Grade {
    /// Total failure; what a missed review word receives
    pub const FAIL: Grade = Grade(0);

    /// Correct after hesitation; what a passed lesson applies
    pub const GOOD: Grade = Grade(4);

    /// Validate a raw grade. Anything outside `0..=5` is rejected.
    pub fn new(value: i32) -> Result<Self> {
        if (0..=MAX_GRADE as i32).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(SrsError::InvalidGrade(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_passing(self) -> bool {
        self.0 >= PASS_THRESHOLD
    }
}

impl TryFrom<i32> for Grade {
    type Error = SrsError;

    fn try_from(value: i32) -> Result<Self> {
        Grade::new(value)
    }
}

impl From<Grade> for i32 {
    fn from(grade: Grade) -> Self {
        grade.0 as i32
    }
}

/// One tracked word in a learner's ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyItem {
    /// Derived from `word`, see [`super::algorithm::vocabulary_id`]
    pub id: Uuid,
    pub word: String,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<String>,
    /// Days until the next review after the last successful recall
    #[serde(default)]
    pub interval: u32,
    /// Consecutive successful recalls since the last lapse
    #[serde(default)]
    pub repetition: u32,
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    /// Epoch milliseconds at which the item becomes due
    pub next_review: i64,
}

fn default_ease_factor() -> f64 {
    DEFAULT_EASE_FACTOR
}

impl VocabularyItem {
    /// Due timestamp as a chrono value
    pub fn next_review_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.next_review)
    }

    /// Check whether the item is due at `now`
    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now.timestamp_millis()
    }

    /// Check whether the item is due right now
    pub fn is_due(&self) -> bool {
        self.is_due_at(Utc::now())
    }

    /// Whole days until the item is due, rounded up. Negative when overdue.
    pub fn days_until(&self, now: DateTime<Utc>) -> i64 {
        let delta = self.next_review - now.timestamp_millis();
        delta.div_euclid(MS_PER_DAY) + i64::from(delta.rem_euclid(MS_PER_DAY) != 0)
    }
}

/// A word as taught by a lesson, before it enters the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonWord {
    pub word: String,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<String>,
}

impl LessonWord {
    pub fn new(word: impl Into<String>, meaning: impl Into<String>, reading: Option<String>) -> Self {
        Self {
            word: word.into(),
            meaning: meaning.into(),
            reading,
        }
    }
}

/// Grade assigned to one pinned item when a review session completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub item_id: Uuid,
    pub grade: Grade,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item_due_at(next_review: i64) -> VocabularyItem {
        VocabularyItem {
            id: Uuid::nil(),
            word: "猫".to_string(),
            meaning: "cat".to_string(),
            reading: Some("neko".to_string()),
            interval: 0,
            repetition: 0,
            ease_factor: DEFAULT_EASE_FACTOR,
            next_review,
        }
    }

    #[test]
    fn test_grade_range() {
        for raw in 0..=5 {
            assert_eq!(Grade::new(raw).unwrap().value(), raw as u8);
        }
        assert!(matches!(Grade::new(-1), Err(SrsError::InvalidGrade(-1))));
        assert!(matches!(Grade::new(6), Err(SrsError::InvalidGrade(6))));
    }

    #[test]
    fn test_grade_passing_threshold() {
        assert!(!Grade::new(2).unwrap().is_passing());
        assert!(Grade::new(3).unwrap().is_passing());
        assert!(Grade::GOOD.is_passing());
        assert!(!Grade::FAIL.is_passing());
    }

    #[test]
    fn test_grade_serde_rejects_out_of_range() {
        let grade: Grade = serde_json::from_str("5").unwrap();
        assert_eq!(grade.value(), 5);
        assert!(serde_json::from_str::<Grade>("9").is_err());
    }

    #[test]
    fn test_item_serializes_camel_case() {
        let json = serde_json::to_value(item_due_at(42)).unwrap();
        assert_eq!(json["nextReview"], 42);
        assert_eq!(json["easeFactor"], 2.5);
        assert_eq!(json["reading"], "neko");
    }

    #[test]
    fn test_is_due_at_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let ms = now.timestamp_millis();

        assert!(item_due_at(ms).is_due_at(now));
        assert!(item_due_at(ms - 1).is_due_at(now));
        assert!(!item_due_at(ms + 1).is_due_at(now));
    }

    #[test]
    fn test_next_review_at() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let item = item_due_at(now.timestamp_millis());

        assert_eq!(item.next_review_at(), Some(now));
        assert!(item.is_due());
    }

    #[test]
    fn test_days_until() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let ms = now.timestamp_millis();

        assert_eq!(item_due_at(ms).days_until(now), 0);
        assert_eq!(item_due_at(ms + 1).days_until(now), 1);
        assert_eq!(item_due_at(ms + 6 * MS_PER_DAY).days_until(now), 6);
        assert_eq!(item_due_at(ms - MS_PER_DAY).days_until(now), -1);
        assert_eq!(item_due_at(ms - MS_PER_DAY - 1).days_until(now), -1);
    }
}
