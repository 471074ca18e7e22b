use serde::Serialize;

use crate::core::time::format_primitive;
use crate::db::models::Progress;
use crate::db::types::Subject;

#[derive(Debug, Serialize)]
pub(crate) struct ProgressResponse {
    pub(crate) id: i64,
    pub(crate) user_id: String,
    pub(crate) subject: Subject,
    pub(crate) skill_level: f64,
    pub(crate) total_exercises: i32,
    pub(crate) completed_exercises: i32,
    pub(crate) average_score: f64,
    pub(crate) streak: i32,
    pub(crate) last_activity: String,
    pub(crate) updated_at: String,
}

impl ProgressResponse {
    pub(crate) fn from_db(progress: Progress) -> Self {
        Self {
            id: progress.id,
            user_id: progress.user_id,
            subject: progress.subject,
            skill_level: progress.skill_level,
            total_exercises: progress.total_exercises,
            completed_exercises: progress.completed_exercises,
            average_score: progress.average_score,
            streak: progress.streak,
            last_activity: format_primitive(progress.last_activity),
            updated_at: format_primitive(progress.updated_at),
        }
    }
}
