use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;

/// Creates the configured teacher account, or promotes and re-keys an existing
/// account with that email. Public signup only ever creates students.
pub(crate) async fn ensure_teacher(state: &AppState) -> anyhow::Result<()> {
    let bootstrap = state.settings().bootstrap();
    if bootstrap.first_teacher_email.is_empty() || bootstrap.first_teacher_password.is_empty() {
        tracing::info!("FIRST_TEACHER_EMAIL not configured; skipping teacher bootstrap");
        return Ok(());
    }

    let email = bootstrap.first_teacher_email.as_str();
    let password = bootstrap.first_teacher_password.as_str();
    let now = primitive_now_utc();

    if let Some(user) = repositories::users::find_by_email(state.db(), email).await? {
        let password_matches =
            security::verify_password(password, &user.hashed_password).unwrap_or(false);
        let needs_role = user.role != UserRole::Teacher;

        if password_matches && !needs_role {
            tracing::info!(user_id = %user.id, "Bootstrap teacher already up to date");
            return Ok(());
        }

        let hashed_password =
            if password_matches { None } else { Some(security::hash_password(password)?) };

        repositories::users::update(
            state.db(),
            &user.id,
            repositories::users::UpdateUser {
                role: Some(UserRole::Teacher),
                hashed_password,
                updated_at: now,
            },
        )
        .await?;

        tracing::info!(user_id = %user.id, promoted = needs_role, "Updated bootstrap teacher");
        return Ok(());
    }

    let user = repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            email,
            hashed_password: security::hash_password(password)?,
            first_name: None,
            last_name: None,
            role: UserRole::Teacher,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "Created bootstrap teacher");
    Ok(())
}
