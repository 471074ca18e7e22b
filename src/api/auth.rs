use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::validation::ValidatedJson;
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::auth::TokenResponse;
use crate::schemas::user::{UserCreate, UserLogin, UserResponse};

const INVALID_LOGIN: &str = "Incorrect email or password";
const EMAIL_TAKEN: &str = "User with this email already exists";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/user", get(current_user))
}

async fn signup(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UserCreate>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let exists = repositories::users::exists_by_email(state.db(), &payload.email)
        .await
        .map_err(|e| ApiError::database(e, "Failed to check existing user").during("signup"))?;

    if exists {
        return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()).during("signup"));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password").during("signup"))?;
    let now = primitive_now_utc();

    let user = repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            email: payload.email.trim(),
            hashed_password,
            first_name: payload.first_name.as_deref(),
            last_name: payload.last_name.as_deref(),
            role: UserRole::Student,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    // A concurrent signup can win the race past the existence check.
    .map_err(|e| {
        ApiError::database_or_conflict(e, EMAIL_TAKEN, "Failed to create user").during("signup")
    })?;

    tracing::info!(user_id = %user.id, "Student account created");

    let response = issue_token(&state, user).map_err(|e| e.during("signup"))?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UserLogin>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = repositories::users::find_by_email(state.db(), payload.email.trim())
        .await
        .map_err(|e| ApiError::database(e, "Failed to load user").during("login"))?
        .ok_or(ApiError::Unauthorized(INVALID_LOGIN))?;

    let verified = security::verify_password(&payload.password, &user.hashed_password)
        .map_err(|_| ApiError::Unauthorized(INVALID_LOGIN))?;

    if !verified {
        return Err(ApiError::Unauthorized(INVALID_LOGIN));
    }

    issue_token(&state, user).map(Json).map_err(|e| e.during("login"))
}

async fn current_user(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_db(user))
}

fn issue_token(state: &AppState, user: User) -> Result<TokenResponse, ApiError> {
    let token = security::create_access_token(&user.id, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    Ok(TokenResponse::bearer(token, UserResponse::from_db(user)))
}
