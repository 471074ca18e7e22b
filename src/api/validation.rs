use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::api::errors::ApiError;

/// JSON body that has been deserialized and passed its `Validate` rules.
/// Malformed bodies and rule violations both surface as 400.
pub(crate) struct ValidatedJson<T>(pub(crate) T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(json_rejection)?;
        value.validate()?;
        Ok(Self(value))
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request as HttpRequest};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 1))]
        name: String,
    }

    fn request(body: &str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn accepts_valid_body() {
        let ValidatedJson(payload) =
            ValidatedJson::<Payload>::from_request(request(r#"{"name":"ok"}"#), &())
                .await
                .expect("valid");
        assert_eq!(payload.name, "ok");
    }

    #[tokio::test]
    async fn rule_violation_is_validation_error() {
        let result = ValidatedJson::<Payload>::from_request(request(r#"{"name":""}"#), &()).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let result = ValidatedJson::<Payload>::from_request(request("{not json"), &()).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));

        let result = ValidatedJson::<Payload>::from_request(request(r#"{"other":1}"#), &()).await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
