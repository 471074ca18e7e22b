use std::collections::{BTreeSet, HashMap};

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::validation::ValidatedJson;
use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::quiz::{QuizAttemptCreate, QuizAttemptResponse};
use crate::services::progress::{quiz_observed_score, QUIZ_SUBJECT};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(list_attempts).post(create_attempt))
}

async fn create_attempt(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<ValidatedJson<QuizAttemptCreate>, ApiError>,
) -> Result<(StatusCode, Json<QuizAttemptResponse>), ApiError> {
    const OPERATION: &str = "createQuizAttempt";
    let ValidatedJson(payload) = payload.map_err(|e| e.during(OPERATION))?;

    let quiz = repositories::quizzes::find_by_id(state.db(), payload.quiz_id)
        .await
        .map_err(|e| ApiError::database(e, "Failed to fetch quiz").during(OPERATION))?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()).during(OPERATION))?;

    let observed_score = quiz_observed_score(payload.score, payload.total_questions);
    let now = primitive_now_utc();

    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::database(e, "Failed to start transaction").during(OPERATION))?;

    let attempt = repositories::quiz_attempts::create(
        &mut *tx,
        repositories::quiz_attempts::CreateQuizAttempt {
            user_id: &user.id,
            quiz_id: quiz.id,
            answers: &payload.answers,
            score: payload.score,
            total_questions: payload.total_questions,
            time_spent: payload.time_spent,
            completed_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::database(e, "Failed to record quiz attempt").during(OPERATION))?;

    repositories::progress::record_observation(&mut tx, &user.id, QUIZ_SUBJECT, observed_score, now)
        .await
        .map_err(|e| ApiError::database(e, "Failed to update progress").during(OPERATION))?;

    tx.commit()
        .await
        .map_err(|e| ApiError::database(e, "Failed to commit quiz attempt").during(OPERATION))?;

    metrics::quiz_attempt_recorded();
    metrics::progress_updated(QUIZ_SUBJECT);
    tracing::info!(
        user_id = %user.id,
        quiz_id = quiz.id,
        attempt_id = attempt.id,
        observed_score,
        "Quiz attempt recorded"
    );

    Ok((StatusCode::CREATED, Json(QuizAttemptResponse::from_db(attempt, Some(&quiz)))))
}

async fn list_attempts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<QuizAttemptResponse>>, ApiError> {
    const OPERATION: &str = "listQuizAttempts";

    let attempts = repositories::quiz_attempts::list_by_user(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::database(e, "Failed to fetch quiz attempts").during(OPERATION))?;

    let quiz_ids: Vec<i64> = attempts
        .iter()
        .map(|attempt| attempt.quiz_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let quizzes: HashMap<i64, _> = repositories::quizzes::list_by_ids(state.db(), &quiz_ids)
        .await
        .map_err(|e| ApiError::database(e, "Failed to fetch quizzes").during(OPERATION))?
        .into_iter()
        .map(|quiz| (quiz.id, quiz))
        .collect();

    Ok(Json(
        attempts
            .into_iter()
            .map(|attempt| {
                let quiz = quizzes.get(&attempt.quiz_id);
                QuizAttemptResponse::from_db(attempt, quiz)
            })
            .collect(),
    ))
}
