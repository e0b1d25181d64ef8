use axum::{
    Extension, Json, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::user::User;
use serde::{Deserialize, Serialize};
use services::services::auth::{self, Identity};
use ts_rs::TS;
use utils_core::response::ApiResponse;

use crate::{AppState, error::ApiError, http::SessionToken};

const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

fn session_ttl() -> chrono::Duration {
    let days = std::env::var("STAFFBOARD_SESSION_TTL_DAYS")
        .ok()
        .and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|days| *days > 0)
        .unwrap_or(DEFAULT_SESSION_TTL_DAYS);
    chrono::Duration::days(days)
}

#[derive(Debug, Deserialize, TS)]
pub struct LoginRequest {
    pub email: String,
    pub credential: String,
}

#[derive(Debug, Serialize, TS)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<LoginResponse>>, ApiError> {
    let (user, token) = auth::login(
        &state.db().pool,
        &payload.email,
        &payload.credential,
        session_ttl(),
    )
    .await?;
    tracing::info!(user_id = %user.id, "User signed in");
    Ok(ResponseJson(ApiResponse::success(LoginResponse {
        user,
        token,
    })))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(token): Extension<SessionToken>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    auth::logout(&state.db().pool, &token.0).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let user = User::find_by_id(&state.db().pool, identity.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    Ok(ResponseJson(ApiResponse::success(user)))
}

/// Routes reachable without a session.
pub fn public_router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Session-scoped routes, mounted behind the auth middleware.
pub fn session_router() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}
