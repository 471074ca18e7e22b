use sqlx::types::Json;
use sqlx::PgPool;

use crate::db::models::{Quiz, QuizQuestion};
use crate::db::types::QuizDifficulty;

const COLUMNS: &str = "id, title, description, difficulty, time_limit, questions, created_at";

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "SELECT {COLUMNS} FROM quizzes ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!("SELECT {COLUMNS} FROM quizzes WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<Quiz>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Quiz>(&format!("SELECT {COLUMNS} FROM quizzes WHERE id = ANY($1)"))
        .bind(ids)
        .fetch_all(pool)
        .await
}

pub(crate) struct InsertQuiz<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub difficulty: QuizDifficulty,
    pub time_limit: i32,
    pub questions: &'a [QuizQuestion],
}

/// Inserts the quiz unless one with the same title exists. Returns whether a
/// row was written.
pub(crate) async fn insert_if_absent(
    pool: &PgPool,
    params: InsertQuiz<'_>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO quizzes (title, description, difficulty, time_limit, questions)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (title) DO NOTHING",
    )
    .bind(params.title)
    .bind(params.description)
    .bind(params.difficulty)
    .bind(params.time_limit)
    .bind(Json(params.questions))
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
