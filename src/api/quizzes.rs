use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::quiz::QuizResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_quizzes)).route("/:quiz_id", get(get_quiz))
}

async fn list_quizzes(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Vec<QuizResponse>>, ApiError> {
    let quizzes = repositories::quizzes::list(state.db())
        .await
        .map_err(|e| ApiError::database(e, "Failed to fetch quizzes").during("listQuizzes"))?;

    Ok(Json(quizzes.into_iter().map(QuizResponse::from_db).collect()))
}

async fn get_quiz(
    State(state): State<AppState>,
    quiz_id: Result<Path<i64>, PathRejection>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<QuizResponse>, ApiError> {
    const OPERATION: &str = "getQuiz";
    let Path(quiz_id) = quiz_id.map_err(|e| ApiError::from(e).during(OPERATION))?;

    let quiz = repositories::quizzes::find_by_id(state.db(), quiz_id)
        .await
        .map_err(|e| ApiError::database(e, "Failed to fetch quiz").during(OPERATION))?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()).during(OPERATION))?;

    Ok(Json(QuizResponse::from_db(quiz)))
}
