use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::time::format_primitive;
use crate::db::models::{Quiz, QuizAttempt, QuizQuestion};
use crate::db::types::QuizDifficulty;

#[derive(Debug, Serialize)]
pub(crate) struct QuizResponse {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) difficulty: QuizDifficulty,
    pub(crate) time_limit: Option<i32>,
    pub(crate) questions: Vec<QuizQuestion>,
    pub(crate) created_at: String,
}

impl QuizResponse {
    pub(crate) fn from_db(quiz: Quiz) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title,
            description: quiz.description,
            difficulty: quiz.difficulty,
            time_limit: quiz.time_limit,
            questions: quiz.questions.0,
            created_at: format_primitive(quiz.created_at),
        }
    }
}

/// Attempt submitted by the client. The score is computed client-side and
/// only checked for consistency here.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "score_within_total", skip_on_field_errors = true))]
pub(crate) struct QuizAttemptCreate {
    #[serde(alias = "quizId")]
    pub(crate) quiz_id: i64,
    #[serde(default)]
    pub(crate) answers: serde_json::Value,
    #[validate(range(min = 0, message = "score must be non-negative"))]
    pub(crate) score: i32,
    #[serde(alias = "totalQuestions")]
    #[validate(range(min = 1, message = "total_questions must be positive"))]
    pub(crate) total_questions: i32,
    #[serde(default)]
    #[serde(alias = "timeSpent")]
    #[validate(range(min = 0, message = "time_spent must be non-negative"))]
    pub(crate) time_spent: Option<i32>,
}

fn score_within_total(attempt: &QuizAttemptCreate) -> Result<(), ValidationError> {
    if attempt.score > attempt.total_questions {
        let mut error = ValidationError::new("score_exceeds_total");
        error.message = Some("score must not exceed total_questions".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizSummary {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) difficulty: QuizDifficulty,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizAttemptResponse {
    pub(crate) id: i64,
    pub(crate) user_id: String,
    pub(crate) quiz_id: i64,
    pub(crate) answers: serde_json::Value,
    pub(crate) score: i32,
    pub(crate) total_questions: i32,
    pub(crate) time_spent: Option<i32>,
    pub(crate) completed_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) quiz: Option<QuizSummary>,
}

impl QuizAttemptResponse {
    pub(crate) fn from_db(attempt: QuizAttempt, quiz: Option<&Quiz>) -> Self {
        Self {
            id: attempt.id,
            user_id: attempt.user_id,
            quiz_id: attempt.quiz_id,
            answers: attempt.answers.0,
            score: attempt.score,
            total_questions: attempt.total_questions,
            time_spent: attempt.time_spent,
            completed_at: format_primitive(attempt.completed_at),
            quiz: quiz.map(|quiz| QuizSummary {
                id: quiz.id,
                title: quiz.title.clone(),
                difficulty: quiz.difficulty,
            }),
        }
    }
}
