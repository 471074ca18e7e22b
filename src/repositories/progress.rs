use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use time::PrimitiveDateTime;

use crate::db::models::Progress;
use crate::db::types::Subject;
use crate::services::class_stats::ActivityRow;
use crate::services::progress::{apply_observation, ProgressSnapshot};

const COLUMNS: &str = "\
    id, user_id, subject, skill_level, total_exercises, completed_exercises, \
    average_score, streak, last_activity, updated_at";

pub(crate) async fn list_by_user(pool: &PgPool, user_id: &str) -> Result<Vec<Progress>, sqlx::Error> {
    sqlx::query_as::<_, Progress>(&format!(
        "SELECT {COLUMNS} FROM progress WHERE user_id = $1 ORDER BY subject"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_activity(pool: &PgPool) -> Result<Vec<ActivityRow>, sqlx::Error> {
    sqlx::query_as::<_, ActivityRow>("SELECT user_id, last_activity FROM progress")
        .fetch_all(pool)
        .await
}

/// Folds `observed_score` into the `(user_id, subject)` record.
///
/// The row is read under `FOR UPDATE` within the caller's transaction, so
/// concurrent observations for the same pair are serialized instead of
/// overwriting each other. A concurrent first insert is detected through
/// `ON CONFLICT` and retried as an update. The lock is held until the caller
/// commits.
pub(crate) async fn record_observation(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &str,
    subject: Subject,
    observed_score: f64,
    now: PrimitiveDateTime,
) -> Result<Progress, sqlx::Error> {
    let conn: &mut PgConnection = tx;

    let record = match lock_existing(conn, user_id, subject).await? {
        Some(current) => update_locked(conn, &current, observed_score, now).await?,
        None => {
            let created = apply_observation(None, observed_score, now);
            match insert_if_absent(conn, user_id, subject, &created, now).await? {
                Some(record) => record,
                None => {
                    let current = lock_existing(conn, user_id, subject)
                        .await?
                        .ok_or(sqlx::Error::RowNotFound)?;
                    update_locked(conn, &current, observed_score, now).await?
                }
            }
        }
    };

    Ok(record)
}

async fn lock_existing(
    conn: &mut PgConnection,
    user_id: &str,
    subject: Subject,
) -> Result<Option<Progress>, sqlx::Error> {
    sqlx::query_as::<_, Progress>(&format!(
        "SELECT {COLUMNS} FROM progress WHERE user_id = $1 AND subject = $2 FOR UPDATE"
    ))
    .bind(user_id)
    .bind(subject)
    .fetch_optional(conn)
    .await
}

async fn insert_if_absent(
    conn: &mut PgConnection,
    user_id: &str,
    subject: Subject,
    snapshot: &ProgressSnapshot,
    now: PrimitiveDateTime,
) -> Result<Option<Progress>, sqlx::Error> {
    sqlx::query_as::<_, Progress>(&format!(
        "INSERT INTO progress (
            user_id, subject, skill_level, total_exercises, completed_exercises,
            average_score, streak, last_activity, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
        ON CONFLICT (user_id, subject) DO NOTHING
        RETURNING {COLUMNS}",
    ))
    .bind(user_id)
    .bind(subject)
    .bind(snapshot.skill_level)
    .bind(snapshot.total_exercises)
    .bind(snapshot.completed_exercises)
    .bind(snapshot.average_score)
    .bind(snapshot.streak)
    .bind(snapshot.last_activity)
    .bind(now)
    .fetch_optional(conn)
    .await
}

async fn update_locked(
    conn: &mut PgConnection,
    current: &Progress,
    observed_score: f64,
    now: PrimitiveDateTime,
) -> Result<Progress, sqlx::Error> {
    let next = apply_observation(Some(&ProgressSnapshot::from(current)), observed_score, now);

    sqlx::query_as::<_, Progress>(&format!(
        "UPDATE progress SET
            skill_level = $1,
            total_exercises = $2,
            completed_exercises = $3,
            average_score = $4,
            streak = $5,
            last_activity = $6,
            updated_at = $7
         WHERE id = $8
         RETURNING {COLUMNS}",
    ))
    .bind(next.skill_level)
    .bind(next.total_exercises)
    .bind(next.completed_exercises)
    .bind(next.average_score)
    .bind(next.streak)
    .bind(next.last_activity)
    .bind(now)
    .bind(current.id)
    .fetch_one(conn)
    .await
}
