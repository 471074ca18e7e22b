use axum::{extract::State, routing::post, Json, Router};

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::MessageResponse;
use crate::services::sample_data::sample_quizzes;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/init-data", post(init_data))
}

/// Seeds the sample quizzes. Disabled in production.
async fn init_data(State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    const OPERATION: &str = "initData";

    if state.settings().runtime().environment.is_production() {
        return Err(
            ApiError::Forbidden("Sample data is not available in production").during(OPERATION)
        );
    }

    let mut inserted = 0usize;
    for quiz in sample_quizzes() {
        let created = repositories::quizzes::insert_if_absent(
            state.db(),
            repositories::quizzes::InsertQuiz {
                title: quiz.title,
                description: quiz.description,
                difficulty: quiz.difficulty,
                time_limit: quiz.time_limit_minutes,
                questions: &quiz.questions,
            },
        )
        .await
        .map_err(|e| ApiError::database(e, "Failed to insert sample quiz").during(OPERATION))?;

        if created {
            inserted += 1;
        }
    }

    tracing::info!(inserted, "Sample data initialized");
    Ok(Json(MessageResponse { message: "Sample data initialized".to_string() }))
}
