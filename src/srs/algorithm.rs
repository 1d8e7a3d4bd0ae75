//! SM-2 Spaced Repetition Algorithm
//!
//! Schedules each vocabulary item from its own review history. A passing
//! grade (3 or more) grows the interval 1 day, then 6 days, then by the ease
//! factor; a failing grade resets the streak and brings the word back
//! tomorrow. Every transition returns a new item, the input is never touched.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::models::{
    Grade, LessonWord, VocabularyItem, DEFAULT_EASE_FACTOR, MAX_GRADE, MIN_EASE_FACTOR, MS_PER_DAY,
};

/// Namespace for name-based vocabulary ids
const VOCABULARY_NAMESPACE: Uuid = Uuid::from_u128(0x6c69_6e67_7561_5665_b273_6500_0000_0001);

/// Stable id for a word: UUID v5 over the exact word text
pub fn vocabulary_id(word: &str) -> Uuid {
    Uuid::new_v5(&VOCABULARY_NAMESPACE, word.as_bytes())
}

/// Create a new item for a freshly taught word, due immediately
pub fn create_vocab_item(word: &LessonWord) -> VocabularyItem {
    create_vocab_item_at(word, Utc::now())
}

/// Create a new item due at `now`
pub fn create_vocab_item_at(word: &LessonWord, now: DateTime<Utc>) -> VocabularyItem {
    VocabularyItem {
        id: vocabulary_id(&word.word),
        word: word.word.clone(),
        meaning: word.meaning.clone(),
        reading: word.reading.clone().filter(|r| !r.is_empty()),
        interval: 0,
        repetition: 0,
        ease_factor: DEFAULT_EASE_FACTOR,
        next_review: now.timestamp_millis(),
    }
}

/// Calculate the next schedule for an item reviewed right now
pub fn calculate_next_review(item: &VocabularyItem, grade: Grade) -> VocabularyItem {
    calculate_next_review_at(item, grade, Utc::now())
}

/// Calculate the next schedule for an item reviewed at `now`
///
/// `next_review` is anchored on `now`, not on the previous due date, so a
/// late review does not add extra delay.
pub fn calculate_next_review_at(
    item: &VocabularyItem,
    grade: Grade,
    now: DateTime<Utc>,
) -> VocabularyItem {
    let (interval, repetition) = if grade.is_passing() {
        let interval = match item.repetition {
            0 => 1,
            1 => 6,
            _ => (f64::from(item.interval) * item.ease_factor).round() as u32,
        };
        (interval, item.repetition + 1)
    } else {
        (1, 0)
    };

    let ease_factor = next_ease_factor(item.ease_factor, grade);
    let next_review = now.timestamp_millis() + i64::from(interval) * MS_PER_DAY;

    VocabularyItem {
        interval,
        repetition,
        ease_factor,
        next_review,
        ..item.clone()
    }
}

/// EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)), floored at 1.3, no ceiling
fn next_ease_factor(ease_factor: f64, grade: Grade) -> f64 {
    let miss = f64::from(MAX_GRADE - grade.value());
    let updated = ease_factor + (0.1 - miss * (0.08 + miss * 0.02));
    updated.max(MIN_EASE_FACTOR)
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: i64) -> String {
    if days <= 0 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}
