use axum::{
    Json,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use services::services::auth;
use utils_core::response::ApiResponse;

use crate::AppState;

/// Raw session token carried alongside the identity, for handlers that
/// operate on the session itself (logout).
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

fn parse_authorization_bearer(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let (prefix, rest) = trimmed.split_once(' ')?;
    if !prefix.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn extract_request_token(req: &Request) -> Option<String> {
    // 1) Authorization: Bearer <token>
    if let Some(value) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_authorization_bearer)
    {
        return Some(value.to_string());
    }

    // 2) X-API-Token: <token>
    if let Some(value) = req
        .headers()
        .get("x-api-token")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        return Some(value.to_string());
    }

    None
}

fn unauthorized(req: &Request, reason: &'static str) -> Response {
    tracing::warn!(
        path = %req.uri().path(),
        method = %req.method(),
        reason,
        "Unauthorized API request"
    );
    let response = ApiResponse::<()>::error("Unauthorized");
    (axum::http::StatusCode::UNAUTHORIZED, Json(response)).into_response()
}

/// Resolves the session token into an `Identity` and attaches it to the
/// request. Requests without a valid session get the standard error
/// envelope with a 401 status.
pub async fn require_session(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(token) = extract_request_token(&req) else {
        return unauthorized(&req, "missing_token");
    };

    let identity = match auth::resolve_identity(&state.db().pool, &token).await {
        Ok(identity) => identity,
        Err(auth::AuthError::InvalidSession) => return unauthorized(&req, "invalid_session"),
        Err(err) => {
            tracing::error!(error = %err, "Failed to resolve session");
            let response = ApiResponse::<()>::error("Internal server error");
            return (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(response),
            )
                .into_response();
        }
    };

    let mut req = req;
    req.extensions_mut().insert(identity);
    req.extensions_mut().insert(SessionToken(token));
    next.run(req).await
}
