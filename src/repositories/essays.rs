use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::Essay;
use crate::db::types::EssayStatus;
use crate::services::class_stats::EssayTotals;

const COLUMNS: &str = "\
    id, user_id, title, content, topic, word_count, grammar_score, structure_score, \
    content_score, overall_score, feedback, status, created_at, updated_at";

pub(crate) struct CreateEssay<'a> {
    pub user_id: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    pub topic: Option<&'a str>,
    pub word_count: i32,
    pub grammar_score: i32,
    pub structure_score: i32,
    pub content_score: i32,
    pub overall_score: i32,
    pub feedback: &'a str,
    pub status: EssayStatus,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create<'e, E>(executor: E, params: CreateEssay<'_>) -> Result<Essay, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    sqlx::query_as::<_, Essay>(&format!(
        "INSERT INTO essays (
            user_id, title, content, topic, word_count, grammar_score, structure_score,
            content_score, overall_score, feedback, status, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$12)
        RETURNING {COLUMNS}",
    ))
    .bind(params.user_id)
    .bind(params.title)
    .bind(params.content)
    .bind(params.topic)
    .bind(params.word_count)
    .bind(params.grammar_score)
    .bind(params.structure_score)
    .bind(params.content_score)
    .bind(params.overall_score)
    .bind(params.feedback)
    .bind(params.status)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Essay>, sqlx::Error> {
    sqlx::query_as::<_, Essay>(&format!("SELECT {COLUMNS} FROM essays WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_user(pool: &PgPool, user_id: &str) -> Result<Vec<Essay>, sqlx::Error> {
    sqlx::query_as::<_, Essay>(&format!(
        "SELECT {COLUMNS} FROM essays WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct EssayWithAuthor {
    #[sqlx(flatten)]
    pub(crate) essay: Essay,
    pub(crate) author_email: String,
    pub(crate) author_first_name: Option<String>,
    pub(crate) author_last_name: Option<String>,
}

pub(crate) async fn list_with_authors(pool: &PgPool) -> Result<Vec<EssayWithAuthor>, sqlx::Error> {
    sqlx::query_as::<_, EssayWithAuthor>(
        "SELECT e.id, e.user_id, e.title, e.content, e.topic, e.word_count, e.grammar_score,
                e.structure_score, e.content_score, e.overall_score, e.feedback, e.status,
                e.created_at, e.updated_at,
                u.email AS author_email,
                u.first_name AS author_first_name,
                u.last_name AS author_last_name
         FROM essays e
         JOIN users u ON u.id = e.user_id
         ORDER BY e.created_at DESC, e.id DESC",
    )
    .fetch_all(pool)
    .await
}

pub(crate) async fn grade_totals(pool: &PgPool) -> Result<EssayTotals, sqlx::Error> {
    sqlx::query_as::<_, EssayTotals>(
        "SELECT COUNT(*) AS total_essays, \
                COUNT(overall_score) FILTER (WHERE status = 'graded') AS graded_essays, \
                COALESCE(SUM(overall_score) FILTER (WHERE status = 'graded'), 0)::BIGINT \
                    AS graded_score_sum \
         FROM essays",
    )
    .fetch_one(pool)
    .await
}
