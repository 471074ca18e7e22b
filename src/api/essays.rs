use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{can_view_essay, CurrentUser};
use crate::api::validation::ValidatedJson;
use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::EssayStatus;
use crate::repositories;
use crate::schemas::essay::{EssayCreate, EssayResponse};
use crate::services::progress::ESSAY_SUBJECT;
use crate::services::scoring::TextStats;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_essays).post(create_essay)).route("/:essay_id", get(get_essay))
}

/// Scores the essay, stores it as graded and folds the overall score into the
/// author's writing progress, all in one transaction.
async fn create_essay(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<ValidatedJson<EssayCreate>, ApiError>,
) -> Result<(StatusCode, Json<EssayResponse>), ApiError> {
    const OPERATION: &str = "createEssay";
    let ValidatedJson(payload) = payload.map_err(|e| e.during(OPERATION))?;

    let score = state
        .scorer()
        .score(&payload.content)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to score essay").during(OPERATION))?;
    let word_count = i32::try_from(TextStats::analyze(&payload.content).word_count)
        .unwrap_or(i32::MAX);
    let now = primitive_now_utc();

    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::database(e, "Failed to start transaction").during(OPERATION))?;

    let essay = repositories::essays::create(
        &mut *tx,
        repositories::essays::CreateEssay {
            user_id: &user.id,
            title: payload.title.trim(),
            content: &payload.content,
            topic: payload.topic.as_deref(),
            word_count,
            grammar_score: score.grammar_score,
            structure_score: score.structure_score,
            content_score: score.content_score,
            overall_score: score.overall_score,
            feedback: &score.feedback,
            status: EssayStatus::Graded,
            created_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::database(e, "Failed to create essay").during(OPERATION))?;

    let progress = repositories::progress::record_observation(
        &mut tx,
        &user.id,
        ESSAY_SUBJECT,
        f64::from(score.overall_score),
        now,
    )
    .await
    .map_err(|e| ApiError::database(e, "Failed to update progress").during(OPERATION))?;

    tx.commit()
        .await
        .map_err(|e| ApiError::database(e, "Failed to commit essay").during(OPERATION))?;

    metrics::essay_graded();
    metrics::progress_updated(ESSAY_SUBJECT);
    tracing::info!(
        user_id = %user.id,
        essay_id = essay.id,
        overall_score = score.overall_score,
        word_count,
        average_score = progress.average_score,
        "Essay graded"
    );

    Ok((StatusCode::CREATED, Json(EssayResponse::from_db(essay))))
}

async fn list_essays(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<EssayResponse>>, ApiError> {
    let essays = repositories::essays::list_by_user(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::database(e, "Failed to fetch essays").during("listEssays"))?;

    Ok(Json(essays.into_iter().map(EssayResponse::from_db).collect()))
}

async fn get_essay(
    State(state): State<AppState>,
    essay_id: Result<Path<i64>, PathRejection>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<EssayResponse>, ApiError> {
    const OPERATION: &str = "getEssay";
    let Path(essay_id) = essay_id.map_err(|e| ApiError::from(e).during(OPERATION))?;

    let essay = repositories::essays::find_by_id(state.db(), essay_id)
        .await
        .map_err(|e| ApiError::database(e, "Failed to fetch essay").during(OPERATION))?
        .ok_or_else(|| ApiError::NotFound("Essay not found".to_string()).during(OPERATION))?;

    if !can_view_essay(&user, &essay.user_id) {
        return Err(ApiError::Forbidden("Not allowed to view this essay").during(OPERATION));
    }

    Ok(Json(EssayResponse::from_db(essay)))
}
