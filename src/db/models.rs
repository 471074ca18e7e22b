use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{EssayStatus, QuizDifficulty, Subject, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) profile_image_url: Option<String>,
    pub(crate) role: UserRole,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Essay {
    pub(crate) id: i64,
    pub(crate) user_id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) topic: Option<String>,
    pub(crate) word_count: i32,
    pub(crate) grammar_score: Option<i32>,
    pub(crate) structure_score: Option<i32>,
    pub(crate) content_score: Option<i32>,
    pub(crate) overall_score: Option<i32>,
    pub(crate) feedback: Option<String>,
    pub(crate) status: EssayStatus,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// One multiple-choice question as stored in `quizzes.questions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct QuizQuestion {
    pub(crate) question: String,
    pub(crate) options: Vec<String>,
    #[serde(alias = "correctAnswer")]
    pub(crate) correct_answer: usize,
    #[serde(default)]
    pub(crate) explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Quiz {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) difficulty: QuizDifficulty,
    pub(crate) time_limit: Option<i32>,
    pub(crate) questions: Json<Vec<QuizQuestion>>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuizAttempt {
    pub(crate) id: i64,
    pub(crate) user_id: String,
    pub(crate) quiz_id: i64,
    pub(crate) answers: Json<serde_json::Value>,
    pub(crate) score: i32,
    pub(crate) total_questions: i32,
    pub(crate) time_spent: Option<i32>,
    pub(crate) completed_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Progress {
    pub(crate) id: i64,
    pub(crate) user_id: String,
    pub(crate) subject: Subject,
    pub(crate) skill_level: f64,
    pub(crate) total_exercises: i32,
    pub(crate) completed_exercises: i32,
    pub(crate) average_score: f64,
    pub(crate) streak: i32,
    pub(crate) last_activity: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}
