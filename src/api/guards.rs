use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;

pub(crate) struct CurrentUser(pub(crate) User);
pub(crate) struct CurrentTeacher(pub(crate) User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(security::bearer_token)
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, app_state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        let user = repositories::users::find_by_id(app_state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::database(e, "Failed to load user"))?;

        let Some(user) = user else {
            return Err(ApiError::Unauthorized("User not found"));
        };

        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentTeacher {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if user.role == UserRole::Teacher {
            Ok(CurrentTeacher(user))
        } else {
            Err(ApiError::Forbidden("Teacher access required"))
        }
    }
}

/// Essays are visible to their author and to teachers.
pub(crate) fn can_view_essay(viewer: &User, owner_id: &str) -> bool {
    viewer.role == UserRole::Teacher || viewer.id == owner_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;

    fn user(id: &str, role: UserRole) -> User {
        let now = primitive_now_utc();
        User {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            hashed_password: String::new(),
            first_name: None,
            last_name: None,
            profile_image_url: None,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn essay_visibility() {
        assert!(can_view_essay(&user("s1", UserRole::Student), "s1"));
        assert!(!can_view_essay(&user("s2", UserRole::Student), "s1"));
        assert!(can_view_essay(&user("t1", UserRole::Teacher), "s1"));
    }
}
