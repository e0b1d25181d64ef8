use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{delete, get},
};
use db::{
    models::user::{CreateUser, User},
    types::UserRole,
};
use services::services::auth::Identity;
use utils_core::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_user_middleware};

fn require_admin(identity: &Identity) -> Result<(), ApiError> {
    if identity.role != UserRole::Admin {
        return Err(ApiError::Forbidden(
            "Only admin users may manage accounts".to_string(),
        ));
    }
    Ok(())
}

pub async fn get_users(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<User>>>, ApiError> {
    let users = User::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(users)))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateUser>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    require_admin(&identity)?;
    if payload.email.trim().is_empty() || payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Name and email must not be empty".to_string(),
        ));
    }
    let user = User::create(&state.db().pool, &payload, Uuid::new_v4()).await?;
    tracing::info!(user_id = %user.id, role = ?user.role, "Created user");
    Ok(ResponseJson(ApiResponse::success(user)))
}

pub async fn get_user(
    Extension(user): Extension<User>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    require_admin(&identity)?;
    if user.id == identity.user_id {
        return Err(ApiError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }
    User::delete(&state.db().pool, user.id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let user_id_router = Router::new()
        .route("/", get(get_user))
        .route("/", delete(delete_user))
        .layer(from_fn_with_state(state.clone(), load_user_middleware::<AppState>));

    let inner = Router::new()
        .route("/", get(get_users).post(create_user))
        .nest("/{user_id}", user_id_router);

    Router::new().nest("/users", inner)
}
