use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::User;
use crate::db::types::UserRole;
use crate::services::class_stats::UserRoleRow;

const COLUMNS: &str = "\
    id, email, hashed_password, first_name, last_name, profile_image_url, \
    role, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Emails are matched case-insensitively; they are stored lowercased.
pub(crate) async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = lower($1)"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn exists_by_email(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = lower($1))")
        .bind(email)
        .fetch_one(pool)
        .await
}

pub(crate) struct CreateUser<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub hashed_password: String,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub role: UserRole,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateUser<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (
            id, email, hashed_password, first_name, last_name, role, created_at, updated_at
        ) VALUES ($1, lower($2), $3, $4, $5, $6, $7, $8)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.email)
    .bind(params.hashed_password)
    .bind(params.first_name)
    .bind(params.last_name)
    .bind(params.role)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateUser {
    pub role: Option<UserRole>,
    pub hashed_password: Option<String>,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(pool: &PgPool, id: &str, params: UpdateUser) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE users SET
            role = COALESCE($1, role),
            hashed_password = COALESCE($2, hashed_password),
            updated_at = $3
         WHERE id = $4",
    )
    .bind(params.role)
    .bind(params.hashed_password)
    .bind(params.updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn list_roles(pool: &PgPool) -> Result<Vec<UserRoleRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRoleRow>("SELECT id, role FROM users").fetch_all(pool).await
}
