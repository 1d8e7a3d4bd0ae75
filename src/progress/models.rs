//! Data models for learner progress

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::srs::{LessonWord, ReviewSession, VocabularyItem};

/// Hearts a learner starts with and is refilled to after a lesson
pub const DEFAULT_MAX_HEARTS: u32 = 5;

fn default_username() -> String {
    "Operative".to_string()
}

fn default_hearts() -> u32 {
    DEFAULT_MAX_HEARTS
}

/// Profile data shared by every course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalProfile {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_hearts")]
    pub hearts: u32,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub last_lesson_date: Option<DateTime<Utc>>,
}

impl Default for GlobalProfile {
    fn default() -> Self {
        Self {
            username: default_username(),
            hearts: default_hearts(),
            streak: 0,
            last_lesson_date: None,
        }
    }
}

/// Per-course progress and vocabulary ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseData {
    #[serde(default)]
    pub xp: u32,
    #[serde(default)]
    pub completed_lessons: Vec<String>,
    #[serde(default)]
    pub vocabulary: BTreeMap<Uuid, VocabularyItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_review: Option<ReviewSession>,
}

/// Everything persisted for one learner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    #[serde(default)]
    pub global: GlobalProfile,
    #[serde(default)]
    pub courses: BTreeMap<String, CourseData>,
    #[serde(default)]
    pub active_course_id: Option<String>,
    /// Bumped on every save, used to detect lost updates
    #[serde(default)]
    pub revision: u64,
}

/// Flattened view of the active course plus the shared profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub username: String,
    pub current_course_id: String,
    pub hearts: u32,
    pub xp: u32,
    pub streak: u32,
    pub last_lesson_date: Option<DateTime<Utc>>,
    pub completed_lessons: Vec<String>,
    pub vocabulary: BTreeMap<Uuid, VocabularyItem>,
    pub pending_review: Option<ReviewSession>,
    /// State revision this view was read at
    pub revision: u64,
}

impl ProgressState {
    /// View of the active course, if one is selected and exists
    pub fn progress(&self) -> Option<UserProgress> {
        let course_id = self.active_course_id.as_ref()?;
        let course = self.courses.get(course_id)?;

        Some(UserProgress {
            username: self.global.username.clone(),
            current_course_id: course_id.clone(),
            hearts: self.global.hearts,
            xp: course.xp,
            streak: self.global.streak,
            last_lesson_date: self.global.last_lesson_date,
            completed_lessons: course.completed_lessons.clone(),
            vocabulary: course.vocabulary.clone(),
            pending_review: course.pending_review.clone(),
            revision: self.revision,
        })
    }

    /// Write a progress view back into the state and make its course active
    pub fn apply_progress(&mut self, progress: &UserProgress) {
        self.global.hearts = progress.hearts;
        self.global.streak = progress.streak;
        self.global.last_lesson_date = progress.last_lesson_date;

        let course = self
            .courses
            .entry(progress.current_course_id.clone())
            .or_default();
        course.xp = progress.xp;
        course.completed_lessons = progress.completed_lessons.clone();
        course.vocabulary = progress.vocabulary.clone();
        course.pending_review = progress.pending_review.clone();

        self.active_course_id = Some(progress.current_course_id.clone());
    }
}

/// A finished non-review lesson
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedLesson {
    pub lesson_id: String,
    pub xp_earned: u32,
    #[serde(default)]
    pub vocabulary: Vec<LessonWord>,
}
