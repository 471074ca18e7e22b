use std::collections::BTreeMap;

use axum::extract::rejection::PathRejection;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use validator::ValidationErrors;

pub(crate) const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";
const DATABASE_UNAVAILABLE: &str = "Database service temporarily unavailable";

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    Forbidden(&'static str),
    BadRequest(String),
    Validation(ValidationErrors),
    NotFound(String),
    Conflict(String),
    TooManyRequests { retry_after: u64 },
    ServiceUnavailable(String),
    Internal(String),
    /// Any of the above, tagged with the client-facing name of the action
    /// that failed.
    During { operation: &'static str, source: Box<ApiError> },
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }

    /// Like [`ApiError::internal`], but connection-level failures become 503.
    pub(crate) fn database(err: sqlx::Error, context: &str) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => {
                tracing::error!(error = %err, "{context}");
                Self::ServiceUnavailable(DATABASE_UNAVAILABLE.to_string())
            }
            _ => Self::internal(err, context),
        }
    }

    /// Like [`ApiError::database`], but a unique-constraint violation becomes
    /// `Conflict(message)`.
    pub(crate) fn database_or_conflict(err: sqlx::Error, message: &str, context: &str) -> Self {
        if is_unique_violation(&err) {
            return Self::Conflict(message.to_string());
        }
        Self::database(err, context)
    }

    /// Attach an operation tag. The innermost tag wins if applied twice.
    pub(crate) fn during(self, operation: &'static str) -> Self {
        match self {
            Self::During { .. } => self,
            other => Self::During { operation, source: Box::new(other) },
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::During { source, .. } => source.status(),
        }
    }

    fn render(self, operation: Option<&'static str>) -> Response {
        let status = self.status();
        let mut body = ErrorResponse {
            status: status.as_u16(),
            detail: String::new(),
            operation,
            errors: None,
            retry_after: None,
        };

        match self {
            ApiError::During { operation, source } => return source.render(Some(operation)),
            ApiError::Unauthorized(message) => {
                body.detail = message.to_string();
                let mut response = (status, Json(body)).into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                return response;
            }
            ApiError::Forbidden(message) => body.detail = message.to_string(),
            ApiError::BadRequest(message)
            | ApiError::NotFound(message)
            | ApiError::Conflict(message) => body.detail = message,
            ApiError::Validation(errors) => {
                body.detail = "Validation failed".to_string();
                body.errors = Some(field_messages(&errors));
            }
            ApiError::TooManyRequests { retry_after } => {
                body.detail = RATE_LIMIT_MESSAGE.to_string();
                body.retry_after = Some(retry_after);
                let mut response = (status, Json(body)).into_response();
                response.headers_mut().insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
                return response;
            }
            ApiError::ServiceUnavailable(message) => {
                tracing::error!(error = %message, operation, "Service unavailable");
                body.detail = message;
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, operation, "Internal server error");
                body.detail = message;
            }
        }

        (status, Json(body)).into_response()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.render(None)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error().is_some_and(|db| db.is_unique_violation())
}

fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, list)| {
            let messages = list
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| error.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use validator::ValidationError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn not_found_carries_operation_tag() {
        let response =
            ApiError::NotFound("Essay not found".to_string()).during("getEssay").into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["status"], 404);
        assert_eq!(json["detail"], "Essay not found");
        assert_eq!(json["operation"], "getEssay");
        assert!(json.get("errors").is_none());
    }

    #[tokio::test]
    async fn innermost_operation_tag_wins() {
        let response = ApiError::Forbidden("Teacher access required")
            .during("getClassStats")
            .during("outer")
            .into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["operation"], "getClassStats");
    }

    #[tokio::test]
    async fn unauthorized_sets_www_authenticate() {
        let response = ApiError::Unauthorized("Invalid authentication credentials").into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[tokio::test]
    async fn validation_lists_field_messages() {
        let mut errors = ValidationErrors::new();
        let mut title = ValidationError::new("length");
        title.message = Some("title must be 1 to 200 characters".into());
        errors.add("title", title);
        errors.add("content", ValidationError::new("blank"));

        let response = ApiError::from(errors).during("createEssay").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["detail"], "Validation failed");
        assert_eq!(json["operation"], "createEssay");
        assert_eq!(json["errors"]["title"][0], "title must be 1 to 200 characters");
        assert_eq!(json["errors"]["content"][0], "blank");
    }

    #[tokio::test]
    async fn too_many_requests_reports_retry_after() {
        let response = ApiError::TooManyRequests { retry_after: 42 }.into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
        let json = body_json(response).await;
        assert_eq!(json["detail"], RATE_LIMIT_MESSAGE);
        assert_eq!(json["retry_after"], 42);
    }

    #[tokio::test]
    async fn path_rejection_is_a_json_bad_request() {
        use axum::extract::Path;
        use axum::http::Request;
        use axum::routing::get;
        use axum::Router;
        use tower::ServiceExt;

        async fn handler(id: Result<Path<i64>, PathRejection>) -> Result<String, ApiError> {
            let Path(id) = id.map_err(|e| ApiError::from(e).during("getEssay"))?;
            Ok(id.to_string())
        }

        let app = Router::new().route("/essays/:id", get(handler));
        let request = Request::builder().uri("/essays/abc").body(axum::body::Body::empty()).unwrap();
        let response = app.oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["operation"], "getEssay");
        assert!(json["detail"].as_str().is_some_and(|detail| detail.contains("abc")));
    }

    #[test]
    fn only_unique_violations_become_conflicts() {
        let err = ApiError::database_or_conflict(
            sqlx::Error::RowNotFound,
            "User with this email already exists",
            "Failed to create user",
        );
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[tokio::test]
    async fn database_errors_are_classified() {
        let unavailable = ApiError::database(sqlx::Error::PoolTimedOut, "Failed to fetch essays");
        assert!(matches!(unavailable, ApiError::ServiceUnavailable(_)));
        let response = unavailable.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["detail"], DATABASE_UNAVAILABLE);

        let internal = ApiError::database(sqlx::Error::RowNotFound, "Failed to fetch essays");
        let response = internal.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["detail"], "Failed to fetch essays");
    }
}
