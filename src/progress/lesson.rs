//! Lesson completion
//!
//! Turns a finished lesson or review session into an updated progress
//! value. Nothing here performs I/O; the caller persists the result.

use chrono::{DateTime, Duration, Utc};

use crate::srs::errors::Result;
use crate::srs::{
    calculate_next_review_at, create_vocab_item_at, vocabulary_id, Grade, ReviewOutcome,
    ReviewSession, SrsError,
};

use super::models::{CompletedLesson, UserProgress, DEFAULT_MAX_HEARTS};

/// Tunables applied when a lesson finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonPolicy {
    /// Hearts are refilled to this after any completed lesson
    pub max_hearts: u32,
    /// Grade applied when a lesson teaches a word already in the ledger
    pub encounter_grade: Grade,
}

impl Default for LessonPolicy {
    fn default() -> Self {
        Self {
            max_hearts: DEFAULT_MAX_HEARTS,
            encounter_grade: Grade::GOOD,
        }
    }
}

/// Apply a finished lesson: new words enter the ledger, known words are
/// rescheduled with `policy.encounter_grade`.
pub fn complete_lesson(
    progress: &UserProgress,
    lesson: &CompletedLesson,
    policy: &LessonPolicy,
    now: DateTime<Utc>,
) -> Result<UserProgress> {
    let mut vocabulary = progress.vocabulary.clone();
    let mut created = 0usize;
    let mut rescheduled = 0usize;

    for word in &lesson.vocabulary {
        let id = vocabulary_id(&word.word);
        match vocabulary.get(&id) {
            Some(existing) if existing.word != word.word => {
                return Err(SrsError::IdCollision {
                    id,
                    existing: existing.word.clone(),
                    incoming: word.word.clone(),
                });
            }
            Some(existing) => {
                let updated = calculate_next_review_at(existing, policy.encounter_grade, now);
                vocabulary.insert(id, updated);
                rescheduled += 1;
            }
            None => {
                vocabulary.insert(id, create_vocab_item_at(word, now));
                created += 1;
            }
        }
    }

    log::info!(
        "Lesson {} complete: {} new words, {} rescheduled",
        lesson.lesson_id,
        created,
        rescheduled
    );

    let mut completed_lessons = progress.completed_lessons.clone();
    if !completed_lessons.contains(&lesson.lesson_id) {
        completed_lessons.push(lesson.lesson_id.clone());
    }

    Ok(UserProgress {
        vocabulary,
        completed_lessons,
        ..record_activity(progress, lesson.xp_earned, policy, now)
    })
}

/// Apply the outcomes of a pinned review session and clear it
///
/// `session` must be the one pending on the progress' own course. Review
/// sessions never count towards `completed_lessons`.
pub fn complete_review(
    progress: &UserProgress,
    session: &ReviewSession,
    outcomes: &[ReviewOutcome],
    xp_earned: u32,
    policy: &LessonPolicy,
    now: DateTime<Utc>,
) -> Result<UserProgress> {
    if session.course_id != progress.current_course_id
        || progress.pending_review.as_ref() != Some(session)
    {
        log::warn!(
            "Review {} is not pending on course {}",
            session.id,
            progress.current_course_id
        );
        return Err(SrsError::SessionMismatch(session.id));
    }
    let vocabulary = session.apply(&progress.vocabulary, outcomes, now)?;

    let missed = outcomes.iter().filter(|o| !o.grade.is_passing()).count();
    log::info!(
        "Review {} complete: {} graded, {} missed",
        session.id,
        outcomes.len(),
        missed
    );

    Ok(UserProgress {
        vocabulary,
        pending_review: None,
        ..record_activity(progress, xp_earned, policy, now)
    })
}

/// Lose one heart after a wrong answer
pub fn lose_heart(progress: &UserProgress) -> UserProgress {
    UserProgress {
        hearts: progress.hearts.saturating_sub(1),
        ..progress.clone()
    }
}

/// Streak after an activity at `now`
///
/// Days are UTC calendar days. Same day keeps the streak, the next day
/// extends it, anything later starts over at 1.
pub fn next_streak(progress: &UserProgress, now: DateTime<Utc>) -> u32 {
    let Some(last) = progress.last_lesson_date else {
        return 1;
    };

    let today = now.date_naive();
    let last_day = last.date_naive();
    if last_day == today {
        progress.streak.max(1)
    } else if last_day == today - Duration::days(1) {
        progress.streak + 1
    } else {
        1
    }
}

/// Streak to display at `now`: zero once a full day has been skipped
pub fn effective_streak(progress: &UserProgress, now: DateTime<Utc>) -> u32 {
    let Some(last) = progress.last_lesson_date else {
        return 0;
    };

    let today = now.date_naive();
    let last_day = last.date_naive();
    if last_day == today || last_day == today - Duration::days(1) {
        progress.streak
    } else {
        0
    }
}

/// XP, hearts refill and streak shared by every completed lesson
fn record_activity(
    progress: &UserProgress,
    xp_earned: u32,
    policy: &LessonPolicy,
    now: DateTime<Utc>,
) -> UserProgress {
    UserProgress {
        xp: progress.xp.saturating_add(xp_earned),
        hearts: policy.max_hearts,
        streak: next_streak(progress, now),
        last_lesson_date: Some(now),
        ..progress.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::models::ProgressState;
    use crate::progress::CourseData;
    use crate::srs::{LessonWord, DEFAULT_EASE_FACTOR, MS_PER_DAY};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 15, 18, 0, 0).unwrap()
    }

    fn fresh_progress() -> UserProgress {
        let mut state = ProgressState::default();
        state.courses.insert("jp".to_string(), CourseData::default());
        state.active_course_id = Some("jp".to_string());
        state.progress().unwrap()
    }

    fn lesson(id: &str, words: &[(&str, &str)]) -> CompletedLesson {
        CompletedLesson {
            lesson_id: id.to_string(),
            xp_earned: 10,
            vocabulary: words
                .iter()
                .map(|(w, m)| LessonWord::new(*w, *m, None))
                .collect(),
        }
    }

    #[test]
    fn test_complete_lesson_creates_items() {
        let progress = fresh_progress();
        let result = complete_lesson(
            &progress,
            &lesson("greetings", &[("こんにちは", "hello"), ("さようなら", "goodbye")]),
            &LessonPolicy::default(),
            now(),
        )
        .unwrap();

        assert_eq!(result.vocabulary.len(), 2);
        let item = &result.vocabulary[&vocabulary_id("こんにちは")];
        assert_eq!(item.meaning, "hello");
        assert_eq!(item.repetition, 0);
        assert_eq!(item.ease_factor, DEFAULT_EASE_FACTOR);
        assert_eq!(item.next_review, now().timestamp_millis());

        assert_eq!(result.xp, 10);
        assert_eq!(result.completed_lessons, vec!["greetings"]);
        // Input is untouched
        assert!(progress.vocabulary.is_empty());
    }

    #[test]
    fn test_complete_lesson_reschedules_known_words() {
        let progress = fresh_progress();
        let policy = LessonPolicy::default();
        let first = complete_lesson(&progress, &lesson("l1", &[("猫", "cat")]), &policy, now()).unwrap();
        let second = complete_lesson(&first, &lesson("l2", &[("猫", "cat")]), &policy, now()).unwrap();

        let item = &second.vocabulary[&vocabulary_id("猫")];
        assert_eq!(item.repetition, 1);
        assert_eq!(item.interval, 1);
        assert_eq!(item.next_review, now().timestamp_millis() + MS_PER_DAY);
        assert_eq!(second.completed_lessons, vec!["l1", "l2"]);
    }

    #[test]
    fn test_complete_lesson_records_lesson_once() {
        let policy = LessonPolicy::default();
        let first = complete_lesson(&fresh_progress(), &lesson("l1", &[]), &policy, now()).unwrap();
        let again = complete_lesson(&first, &lesson("l1", &[]), &policy, now()).unwrap();

        assert_eq!(again.completed_lessons, vec!["l1"]);
        assert_eq!(again.xp, 20);
    }

    #[test]
    fn test_complete_lesson_detects_collision() {
        let mut progress = fresh_progress();
        let mut forged = create_vocab_item_at(&LessonWord::new("犬", "dog", None), now());
        forged.word = "dog".to_string();
        progress.vocabulary.insert(forged.id, forged);

        let result = complete_lesson(
            &progress,
            &lesson("l1", &[("犬", "dog")]),
            &LessonPolicy::default(),
            now(),
        );
        assert!(matches!(result, Err(SrsError::IdCollision { .. })));
    }

    #[test]
    fn test_complete_lesson_refills_hearts() {
        let progress = lose_heart(&lose_heart(&fresh_progress()));
        assert_eq!(progress.hearts, 3);

        let policy = LessonPolicy { max_hearts: 7, ..LessonPolicy::default() };
        let result = complete_lesson(&progress, &lesson("l1", &[]), &policy, now()).unwrap();
        assert_eq!(result.hearts, 7);
    }

    #[test]
    fn test_lose_heart_saturates() {
        let mut progress = fresh_progress();
        progress.hearts = 0;
        assert_eq!(lose_heart(&progress).hearts, 0);
    }

    #[test]
    fn test_complete_review_grades_pinned_batch() {
        let policy = LessonPolicy::default();
        let learned = complete_lesson(
            &fresh_progress(),
            &lesson("l1", &[("一", "one"), ("二", "two")]),
            &policy,
            now(),
        )
        .unwrap();

        let session = ReviewSession::begin("jp", &learned.vocabulary, 10, now()).unwrap();
        let pinned = UserProgress {
            pending_review: Some(session.clone()),
            ..learned
        };

        let mut outcomes = session.grade_all(Grade::GOOD);
        outcomes[0].grade = Grade::FAIL;

        let result = complete_review(&pinned, &session, &outcomes, 5, &policy, now()).unwrap();

        assert!(result.pending_review.is_none());
        assert_eq!(result.completed_lessons, vec!["l1"]);
        assert_eq!(result.xp, 15);
        let failed = &result.vocabulary[&outcomes[0].item_id];
        let passed = &result.vocabulary[&outcomes[1].item_id];
        assert_eq!(failed.repetition, 0);
        assert!(failed.ease_factor < DEFAULT_EASE_FACTOR);
        assert_eq!(passed.repetition, 1);
    }

    #[test]
    fn test_complete_review_keeps_session_on_error() {
        let session = ReviewSession {
            id: uuid::Uuid::new_v4(),
            course_id: "jp".to_string(),
            item_ids: vec![vocabulary_id("消えた")],
            words: vec!["消えた".to_string()],
            started_at: now(),
        };
        let progress = UserProgress {
            pending_review: Some(session.clone()),
            ..fresh_progress()
        };

        let result = complete_review(
            &progress,
            &session,
            &session.grade_all(Grade::GOOD),
            5,
            &LessonPolicy::default(),
            now(),
        );
        assert!(matches!(result, Err(SrsError::ItemNotFound(_))));
    }

    #[test]
    fn test_complete_review_rejects_session_not_pending() {
        let policy = LessonPolicy::default();
        let learned = complete_lesson(
            &fresh_progress(),
            &lesson("l1", &[("一", "one")]),
            &policy,
            now(),
        )
        .unwrap();
        let pending = ReviewSession::begin("jp", &learned.vocabulary, 10, now()).unwrap();
        let pinned = UserProgress {
            pending_review: Some(pending.clone()),
            ..learned.clone()
        };

        // An older session for the same words
        let stale = ReviewSession::begin("jp", &learned.vocabulary, 10, now()).unwrap();
        let result = complete_review(&pinned, &stale, &stale.grade_all(Grade::GOOD), 5, &policy, now());
        assert!(matches!(result, Err(SrsError::SessionMismatch(id)) if id == stale.id));

        // The right session, but from another course
        let foreign = ReviewSession {
            course_id: "es".to_string(),
            ..pending.clone()
        };
        let result = complete_review(&pinned, &foreign, &foreign.grade_all(Grade::GOOD), 5, &policy, now());
        assert!(matches!(result, Err(SrsError::SessionMismatch(_))));

        // Nothing pending at all
        let result = complete_review(&learned, &pending, &pending.grade_all(Grade::GOOD), 5, &policy, now());
        assert!(matches!(result, Err(SrsError::SessionMismatch(_))));
    }

    #[test]
    fn test_next_streak_rules() {
        let mut progress = fresh_progress();
        assert_eq!(next_streak(&progress, now()), 1);

        progress.streak = 4;
        progress.last_lesson_date = Some(now() - Duration::hours(2));
        assert_eq!(next_streak(&progress, now()), 4);

        progress.last_lesson_date = Some(now() - Duration::days(1));
        assert_eq!(next_streak(&progress, now()), 5);

        progress.last_lesson_date = Some(now() - Duration::days(3));
        assert_eq!(next_streak(&progress, now()), 1);
    }

    #[test]
    fn test_effective_streak_expires() {
        let mut progress = fresh_progress();
        assert_eq!(effective_streak(&progress, now()), 0);

        progress.streak = 6;
        progress.last_lesson_date = Some(now() - Duration::days(1));
        assert_eq!(effective_streak(&progress, now()), 6);

        progress.last_lesson_date = Some(now() - Duration::days(2));
        assert_eq!(effective_streak(&progress, now()), 0);
    }
}
