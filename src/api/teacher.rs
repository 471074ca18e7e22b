use axum::{extract::State, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::core::state::AppState;
use crate::core::time::today_utc;
use crate::repositories;
use crate::schemas::essay::TeacherEssayResponse;
use crate::services::class_stats::{compute_class_stats, ClassStats};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/essays", get(list_all_essays)).route("/stats", get(class_stats))
}

async fn list_all_essays(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
) -> Result<Json<Vec<TeacherEssayResponse>>, ApiError> {
    let rows = repositories::essays::list_with_authors(state.db())
        .await
        .map_err(|e| ApiError::database(e, "Failed to fetch essays").during("listAllEssays"))?;

    Ok(Json(rows.into_iter().map(TeacherEssayResponse::from_row).collect()))
}

async fn class_stats(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
) -> Result<Json<ClassStats>, ApiError> {
    const OPERATION: &str = "getClassStats";
    let db = state.db();

    let (users, essays, activity) = tokio::try_join!(
        repositories::users::list_roles(db),
        repositories::essays::grade_totals(db),
        repositories::progress::list_activity(db),
    )
    .map_err(|e| ApiError::database(e, "Failed to load class statistics").during(OPERATION))?;

    Ok(Json(compute_class_stats(&users, essays, &activity, today_utc())))
}
