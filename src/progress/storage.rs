//! Storage operations for learner progress
//!
//! Directory structure:
//! ```text
//! {data-dir}/
//! ├── state.json    # ProgressState: profile, courses, vocabulary ledgers
//! └── state.lock    # advisory lock held for each read-modify-write
//! ```
//!
//! One data directory holds one learner. Every write holds the store mutex
//! and an exclusive lock on `state.lock` from load to rename, so writers in
//! other threads or processes queue up instead of overwriting each other.
//! [`ProgressStorage::save_progress`] additionally rejects views read before
//! the last save.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use fs4::fs_std::FileExt;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::srs::{ReviewOutcome, ReviewSession, SrsError};

use super::lesson::{complete_review, LessonPolicy};
use super::models::{CourseData, GlobalProfile, ProgressState, UserProgress};

#[derive(Error, Debug)]
pub enum ProgressStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Srs(#[from] SrsError),

    #[error("Data directory not found")]
    DataDirNotFound,

    #[error("No active course. Select one first.")]
    NoActiveCourse,

    #[error("Course not found: {0}")]
    CourseNotFound(String),

    #[error("Progress was modified concurrently (expected revision {expected}, found {found})")]
    RevisionConflict { expected: u64, found: u64 },

    #[error("No review session in progress")]
    NoPendingReview,

    #[error("A review session is already in progress")]
    ReviewAlreadyPending,

    #[error("Progress lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, ProgressStorageError>;

/// Held for the duration of one read-modify-write
struct WriteGuard<'a> {
    _mutex: MutexGuard<'a, ()>,
    /// Dropping the handle releases the file lock
    _lock_file: File,
}

/// File-backed store for one learner's progress
pub struct ProgressStorage {
    base_path: PathBuf,
    /// Profile used when no state file exists yet
    default_profile: GlobalProfile,
    write_lock: Mutex<()>,
}

impl ProgressStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            default_profile: GlobalProfile::default(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_default_profile(mut self, profile: GlobalProfile) -> Self {
        self.default_profile = profile;
        self
    }

    /// Get the default data directory
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("linguaverse"))
            .ok_or(ProgressStorageError::DataDirNotFound)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn state_path(&self) -> PathBuf {
        self.base_path.join("state.json")
    }

    fn lock_path(&self) -> PathBuf {
        self.base_path.join("state.lock")
    }

    /// Take the store mutex, then the exclusive file lock
    fn lock_for_write(&self) -> Result<WriteGuard<'_>> {
        let mutex = self
            .write_lock
            .lock()
            .map_err(|_| ProgressStorageError::LockPoisoned)?;

        self.init()?;
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        FileExt::lock_exclusive(&lock_file)?;

        Ok(WriteGuard {
            _mutex: mutex,
            _lock_file: lock_file,
        })
    }

    /// Initialize storage directories
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.base_path)?;
        Ok(())
    }

    // ==================== State Operations ====================

    /// Load the full state. A missing file is an empty state; a corrupt one
    /// is an error so the ledger is never overwritten by accident.
    pub fn load_state(&self) -> Result<ProgressState> {
        let path = self.state_path();
        if !path.exists() {
            return Ok(ProgressState {
                global: self.default_profile.clone(),
                ..ProgressState::default()
            });
        }

        let content = fs::read_to_string(&path)?;
        let state: ProgressState = serde_json::from_str(&content).map_err(|e| {
            log::error!("Failed to parse progress state {:?}: {}", path, e);
            e
        })?;
        log::debug!("Loaded progress state revision {}", state.revision);
        Ok(state)
    }

    /// Atomic write: a uniquely named temp file in the data dir, then rename.
    /// Callers must hold the write lock.
    fn save_state(&self, state: &ProgressState) -> Result<()> {
        self.init()?;
        let mut tmp = NamedTempFile::new_in(&self.base_path)?;
        tmp.write_all(serde_json::to_string_pretty(state)?.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.state_path()).map_err(|e| e.error)?;
        log::debug!("Saved progress state revision {}", state.revision);
        Ok(())
    }

    // ==================== Progress Operations ====================

    /// Progress for the active course, or `None` when no course is selected
    pub fn get_progress(&self) -> Result<Option<UserProgress>> {
        Ok(self.load_state()?.progress())
    }

    /// Progress for the active course, failing when none is selected
    pub fn require_progress(&self) -> Result<UserProgress> {
        self.get_progress()?
            .ok_or(ProgressStorageError::NoActiveCourse)
    }

    /// Persist a progress view read earlier
    ///
    /// Fails with `RevisionConflict` if the state was saved since `progress`
    /// was read. Returns the progress at its new revision.
    pub fn save_progress(&self, progress: &UserProgress) -> Result<UserProgress> {
        let _guard = self.lock_for_write()?;
        self.save_progress_locked(progress)
    }

    fn save_progress_locked(&self, progress: &UserProgress) -> Result<UserProgress> {
        let mut state = self.load_state()?;
        if state.revision != progress.revision {
            log::warn!(
                "Rejecting stale progress: read at revision {}, stored revision {}",
                progress.revision,
                state.revision
            );
            return Err(ProgressStorageError::RevisionConflict {
                expected: progress.revision,
                found: state.revision,
            });
        }

        state.apply_progress(progress);
        state.revision += 1;
        self.save_state(&state)?;

        Ok(UserProgress {
            revision: state.revision,
            ..progress.clone()
        })
    }

    /// Read-modify-write the active course under the store lock
    pub fn update_progress<F>(&self, update: F) -> Result<UserProgress>
    where
        F: FnOnce(&UserProgress) -> Result<UserProgress>,
    {
        let _guard = self.lock_for_write()?;

        let current = self
            .load_state()?
            .progress()
            .ok_or(ProgressStorageError::NoActiveCourse)?;
        let updated = update(&current)?;
        self.save_progress_locked(&UserProgress {
            revision: current.revision,
            ..updated
        })
    }

    // ==================== Course Operations ====================

    /// Create a course if needed and make it active
    pub fn init_course(&self, course_id: &str) -> Result<UserProgress> {
        let _guard = self.lock_for_write()?;

        let mut state = self.load_state()?;
        if !state.courses.contains_key(course_id) {
            state
                .courses
                .insert(course_id.to_string(), CourseData::default());
            log::info!("Initialized course {}", course_id);
        }
        state.active_course_id = Some(course_id.to_string());
        state.revision += 1;
        self.save_state(&state)?;

        state
            .progress()
            .ok_or_else(|| ProgressStorageError::CourseNotFound(course_id.to_string()))
    }

    /// Ids of every course the learner has started
    pub fn available_courses(&self) -> Result<Vec<String>> {
        Ok(self.load_state()?.courses.into_keys().collect())
    }

    // ==================== Review Operations ====================

    /// Pin a review batch on the active course
    ///
    /// Returns `None` when the ledger is empty.
    pub fn begin_review(&self, limit: usize, now: DateTime<Utc>) -> Result<Option<ReviewSession>> {
        let mut session = None;
        self.update_progress(|progress| {
            if progress.pending_review.is_some() {
                return Err(ProgressStorageError::ReviewAlreadyPending);
            }
            session = ReviewSession::begin(
                &progress.current_course_id,
                &progress.vocabulary,
                limit,
                now,
            );
            Ok(UserProgress {
                pending_review: session.clone(),
                ..progress.clone()
            })
        })?;

        if let Some(s) = &session {
            log::info!("Started review {} with {} items", s.id, s.item_ids.len());
        }
        Ok(session)
    }

    /// Grade the pinned review batch and clear it
    pub fn finish_review(
        &self,
        outcomes: impl FnOnce(&ReviewSession) -> Vec<ReviewOutcome>,
        xp_earned: u32,
        policy: &LessonPolicy,
        now: DateTime<Utc>,
    ) -> Result<UserProgress> {
        self.update_progress(|progress| {
            let session = progress
                .pending_review
                .as_ref()
                .ok_or(ProgressStorageError::NoPendingReview)?;
            let outcomes = outcomes(session);
            Ok(complete_review(
                progress, session, &outcomes, xp_earned, policy, now,
            )?)
        })
    }

    /// Drop the pinned review batch without grading
    pub fn cancel_review(&self) -> Result<ReviewSession> {
        let mut cancelled = None;
        self.update_progress(|progress| {
            cancelled = progress.pending_review.clone();
            if cancelled.is_none() {
                return Err(ProgressStorageError::NoPendingReview);
            }
            Ok(UserProgress {
                pending_review: None,
                ..progress.clone()
            })
        })?;

        let session = cancelled.ok_or(ProgressStorageError::NoPendingReview)?;
        log::info!("Cancelled review {}", session.id);
        Ok(session)
    }
}
