use axum::{extract::State, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::progress::ProgressResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_progress))
}

async fn list_progress(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<ProgressResponse>>, ApiError> {
    let records = repositories::progress::list_by_user(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::database(e, "Failed to fetch progress").during("getProgress"))?;

    Ok(Json(records.into_iter().map(ProgressResponse::from_db).collect()))
}
