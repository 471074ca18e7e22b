use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, Method};
use axum::middleware::Next;
use axum::response::Response;

use crate::api::errors::ApiError;
use crate::core::{metrics, security, state::AppState};
use crate::services::rate_limit::{RateDecision, RatePolicy};

/// Endpoints that also count against the strict policy. Paths are relative to
/// the API prefix.
const WRITE_LIMITED: [&str; 3] = ["/essays", "/quiz-attempts", "/init-data"];

pub(crate) fn is_write_limited(method: &Method, path: &str) -> bool {
    method == Method::POST && WRITE_LIMITED.contains(&path.trim_end_matches('/'))
}

/// Authenticated user id when the request carries a valid token, otherwise
/// the peer address.
pub(crate) fn client_identifier(request: &Request, state: &AppState) -> String {
    let user_id = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(security::bearer_token)
        .and_then(|token| security::verify_token(token, state.settings()).ok())
        .map(|claims| claims.sub);

    if let Some(user_id) = user_id {
        return format!("user:{user_id}");
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| format!("ip:{}", addr.ip()))
        .unwrap_or_else(|| "unknown".to_string())
}

pub(crate) async fn enforce(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let limiter = state.rate_limiter();
    if !limiter.enabled() {
        return Ok(next.run(request).await);
    }

    let identifier = client_identifier(&request, &state);
    check(&state, limiter.moderate(), &identifier).await?;

    if is_write_limited(request.method(), request.uri().path()) {
        check(&state, limiter.strict(), &identifier).await?;
    }

    Ok(next.run(request).await)
}

async fn check(state: &AppState, policy: &RatePolicy, identifier: &str) -> Result<(), ApiError> {
    match state.rate_limiter().check(policy, identifier).await {
        RateDecision::Allowed { .. } => Ok(()),
        RateDecision::Limited { retry_after_seconds } => {
            metrics::request_rate_limited(policy.name);
            tracing::warn!(policy = policy.name, identifier, retry_after_seconds, "Rate limit exceeded");
            Err(ApiError::TooManyRequests { retry_after: retry_after_seconds })
        }
    }
}
