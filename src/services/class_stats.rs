use std::collections::{HashMap, HashSet};

use serde::Serialize;
use time::{Date, PrimitiveDateTime};

use crate::core::time::is_same_utc_day;
use crate::db::types::UserRole;

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct UserRoleRow {
    pub(crate) id: String,
    pub(crate) role: UserRole,
}

/// Essay counts aggregated in SQL. `graded_*` only cover graded essays with
/// an overall score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub(crate) struct EssayTotals {
    pub(crate) total_essays: i64,
    pub(crate) graded_essays: i64,
    pub(crate) graded_score_sum: i64,
}

impl EssayTotals {
    /// Rounded mean of graded overall scores, 0 when nothing is graded.
    pub(crate) fn average_score(&self) -> i64 {
        if self.graded_essays <= 0 {
            return 0;
        }
        (self.graded_score_sum as f64 / self.graded_essays as f64).round() as i64
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ActivityRow {
    pub(crate) user_id: String,
    pub(crate) last_activity: PrimitiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct ClassStats {
    pub(crate) total_students: i64,
    pub(crate) average_score: i64,
    pub(crate) total_essays: i64,
    pub(crate) active_today: i64,
}

/// Class-wide aggregate for the teacher dashboard.
///
/// A student counts as active when their most recent activity across all
/// subjects falls on `today` (UTC calendar day).
pub(crate) fn compute_class_stats(
    users: &[UserRoleRow],
    essays: EssayTotals,
    activity: &[ActivityRow],
    today: Date,
) -> ClassStats {
    let students: HashSet<&str> = users
        .iter()
        .filter(|user| user.role == UserRole::Student)
        .map(|user| user.id.as_str())
        .collect();

    let mut latest: HashMap<&str, PrimitiveDateTime> = HashMap::new();
    for row in activity.iter().filter(|row| students.contains(row.user_id.as_str())) {
        latest
            .entry(row.user_id.as_str())
            .and_modify(|seen| *seen = (*seen).max(row.last_activity))
            .or_insert(row.last_activity);
    }
    let active_today =
        latest.values().filter(|last| is_same_utc_day(**last, today)).count() as i64;

    ClassStats {
        total_students: students.len() as i64,
        average_score: essays.average_score(),
        total_essays: essays.total_essays,
        active_today,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn user(id: &str, role: UserRole) -> UserRoleRow {
        UserRoleRow { id: id.to_string(), role }
    }

    fn totals(total_essays: i64, graded_scores: &[i64]) -> EssayTotals {
        EssayTotals {
            total_essays,
            graded_essays: graded_scores.len() as i64,
            graded_score_sum: graded_scores.iter().sum(),
        }
    }

    fn activity(user_id: &str, last_activity: PrimitiveDateTime) -> ActivityRow {
        ActivityRow { user_id: user_id.to_string(), last_activity }
    }

    #[test]
    fn counts_students_essays_and_graded_average() {
        let users = [
            user("s1", UserRole::Student),
            user("s2", UserRole::Student),
            user("t1", UserRole::Teacher),
        ];
        let stats = compute_class_stats(&users, totals(3, &[80, 90]), &[], date!(2025-06-01));
        assert_eq!(
            stats,
            ClassStats { total_students: 2, average_score: 85, total_essays: 3, active_today: 0 }
        );
    }

    #[test]
    fn average_is_zero_without_graded_essays() {
        let stats = compute_class_stats(&[], totals(2, &[]), &[], date!(2025-06-01));
        assert_eq!(stats.average_score, 0);
        assert_eq!(stats.total_essays, 2);
    }

    #[test]
    fn average_rounds_half_up() {
        let stats = compute_class_stats(&[], totals(2, &[80, 81]), &[], date!(2025-06-01));
        assert_eq!(stats.average_score, 81);
    }

    #[test]
    fn active_today_uses_latest_activity_per_student() {
        let today = date!(2025-06-01);
        let users = [
            user("s1", UserRole::Student),
            user("s2", UserRole::Student),
            user("s3", UserRole::Student),
            user("t1", UserRole::Teacher),
        ];
        let activity = [
            // s1 active today in two subjects: counted once.
            activity("s1", datetime!(2025-06-01 08:15:00)),
            activity("s1", datetime!(2025-06-01 21:40:00)),
            // s2 last seen yesterday.
            activity("s2", datetime!(2025-05-31 23:59:59)),
            // s3 old writing record, fresh grammar record.
            activity("s3", datetime!(2025-04-10 10:00:00)),
            activity("s3", datetime!(2025-06-01 00:00:00)),
            // teachers never count.
            activity("t1", datetime!(2025-06-01 12:00:00)),
        ];

        let stats = compute_class_stats(&users, EssayTotals::default(), &activity, today);
        assert_eq!(stats.active_today, 2);
        assert_eq!(stats.total_students, 3);
    }
}
