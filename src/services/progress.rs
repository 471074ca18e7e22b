use time::PrimitiveDateTime;

use crate::db::models::Progress;
use crate::db::types::Subject;

const MAX_SKILL_LEVEL: f64 = 100.0;

/// The mutable part of a progress record, detached from its storage identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ProgressSnapshot {
    pub(crate) skill_level: f64,
    pub(crate) total_exercises: i32,
    pub(crate) completed_exercises: i32,
    pub(crate) average_score: f64,
    pub(crate) streak: i32,
    pub(crate) last_activity: PrimitiveDateTime,
}

impl From<&Progress> for ProgressSnapshot {
    fn from(record: &Progress) -> Self {
        Self {
            skill_level: record.skill_level,
            total_exercises: record.total_exercises,
            completed_exercises: record.completed_exercises,
            average_score: record.average_score,
            streak: record.streak,
            last_activity: record.last_activity,
        }
    }
}

/// Folds one observed score into the running statistics for a subject.
///
/// `average_score` is the cumulative mean of every observation so far and
/// `skill_level` is always `min(100, average_score)`. The streak is seeded at 1
/// on creation and carried over unchanged on later observations.
pub(crate) fn apply_observation(
    existing: Option<&ProgressSnapshot>,
    observed_score: f64,
    now: PrimitiveDateTime,
) -> ProgressSnapshot {
    let Some(current) = existing else {
        return ProgressSnapshot {
            skill_level: observed_score.min(MAX_SKILL_LEVEL),
            total_exercises: 1,
            completed_exercises: 1,
            average_score: observed_score,
            streak: 1,
            last_activity: now,
        };
    };

    let previous_total = current.total_exercises.max(0);
    let new_total = previous_total + 1;
    let new_average =
        (current.average_score * f64::from(previous_total) + observed_score) / f64::from(new_total);

    ProgressSnapshot {
        skill_level: new_average.min(MAX_SKILL_LEVEL),
        total_exercises: new_total,
        completed_exercises: current.completed_exercises.max(0) + 1,
        average_score: new_average,
        streak: current.streak,
        last_activity: now,
    }
}

/// Subject a quiz attempt counts towards. Fixed: quizzes always feed grammar.
pub(crate) const QUIZ_SUBJECT: Subject = Subject::Grammar;

/// Subject an essay submission counts towards.
pub(crate) const ESSAY_SUBJECT: Subject = Subject::Writing;

/// Percentage score of a quiz attempt. `total_questions` is validated to be
/// positive before this is reached.
pub(crate) fn quiz_observed_score(score: i32, total_questions: i32) -> f64 {
    f64::from(score) / f64::from(total_questions) * 100.0
}
