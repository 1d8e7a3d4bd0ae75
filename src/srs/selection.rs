//! Due-item selection and review session snapshots
//!
//! A review session pins the batch it was started with. Completing the
//! session grades exactly those ids, even if words were added to the ledger
//! in between.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::algorithm::calculate_next_review_at;
use super::errors::{Result, SrsError};
use super::models::{Grade, ReviewOutcome, VocabularyItem};

/// Pick the `limit` items with the earliest `next_review`, most overdue first
pub fn select_review_batch<'a, I>(items: I, limit: usize) -> Vec<&'a VocabularyItem>
where
    I: IntoIterator<Item = &'a VocabularyItem>,
{
    let mut sorted: Vec<&VocabularyItem> = items.into_iter().collect();
    sorted.sort_by_key(|item| item.next_review);
    sorted.truncate(limit);
    sorted
}

/// All items due at `now`, oldest first
pub fn due_items<'a, I>(items: I, now: DateTime<Utc>) -> Vec<&'a VocabularyItem>
where
    I: IntoIterator<Item = &'a VocabularyItem>,
{
    let mut due: Vec<&VocabularyItem> = items.into_iter().filter(|i| i.is_due_at(now)).collect();
    due.sort_by_key(|item| item.next_review);
    due
}

/// A review batch captured once at session start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSession {
    pub id: Uuid,
    pub course_id: String,
    /// Pinned item ids in selection order
    pub item_ids: Vec<Uuid>,
    /// Surface forms, parallel to `item_ids`
    pub words: Vec<String>,
    pub started_at: DateTime<Utc>,
}

impl ReviewSession {
    /// Select and pin a batch. Returns `None` when there is nothing to review.
    pub fn begin(
        course_id: &str,
        vocabulary: &BTreeMap<Uuid, VocabularyItem>,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let batch = select_review_batch(vocabulary.values(), limit);
        if batch.is_empty() {
            return None;
        }

        Some(Self {
            id: Uuid::new_v4(),
            course_id: course_id.to_string(),
            item_ids: batch.iter().map(|item| item.id).collect(),
            words: batch.iter().map(|item| item.word.clone()).collect(),
            started_at: now,
        })
    }

    /// Topic line handed to the lesson generator
    pub fn topic(&self) -> String {
        format!("Review: {}", self.words.join(", "))
    }

    pub fn contains(&self, item_id: Uuid) -> bool {
        self.item_ids.contains(&item_id)
    }

    /// Same grade for every pinned item
    pub fn grade_all(&self, grade: Grade) -> Vec<ReviewOutcome> {
        self.item_ids
            .iter()
            .map(|&item_id| ReviewOutcome { item_id, grade })
            .collect()
    }

    /// Apply outcomes to the pinned items, returning a new vocabulary map
    ///
    /// Every outcome must name a pinned id at most once, and every graded id
    /// must still be in the vocabulary. Items outside the outcomes are left
    /// untouched.
    pub fn apply(
        &self,
        vocabulary: &BTreeMap<Uuid, VocabularyItem>,
        outcomes: &[ReviewOutcome],
        now: DateTime<Utc>,
    ) -> Result<BTreeMap<Uuid, VocabularyItem>> {
        let mut updated = vocabulary.clone();
        let mut graded = BTreeSet::new();

        for outcome in outcomes {
            if !self.contains(outcome.item_id) {
                return Err(SrsError::NotInSession(outcome.item_id));
            }
            if !graded.insert(outcome.item_id) {
                return Err(SrsError::DuplicateOutcome(outcome.item_id));
            }
            let item = vocabulary
                .get(&outcome.item_id)
                .ok_or(SrsError::ItemNotFound(outcome.item_id))?;
            updated.insert(
                outcome.item_id,
                calculate_next_review_at(item, outcome.grade, now),
            );
        }

        Ok(updated)
    }
}
