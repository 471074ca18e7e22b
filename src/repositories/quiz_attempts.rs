use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::QuizAttempt;

const COLUMNS: &str = "id, user_id, quiz_id, answers, score, total_questions, time_spent, completed_at";

pub(crate) struct CreateQuizAttempt<'a> {
    pub user_id: &'a str,
    pub quiz_id: i64,
    pub answers: &'a serde_json::Value,
    pub score: i32,
    pub total_questions: i32,
    pub time_spent: Option<i32>,
    pub completed_at: PrimitiveDateTime,
}

pub(crate) async fn create<'e, E>(
    executor: E,
    params: CreateQuizAttempt<'_>,
) -> Result<QuizAttempt, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "INSERT INTO quiz_attempts (
            user_id, quiz_id, answers, score, total_questions, time_spent, completed_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING {COLUMNS}",
    ))
    .bind(params.user_id)
    .bind(params.quiz_id)
    .bind(Json(params.answers))
    .bind(params.score)
    .bind(params.total_questions)
    .bind(params.time_spent)
    .bind(params.completed_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_by_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<QuizAttempt>, sqlx::Error> {
    sqlx::query_as::<_, QuizAttempt>(&format!(
        "SELECT {COLUMNS} FROM quiz_attempts WHERE user_id = $1 ORDER BY completed_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}
