use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{delete, get, post, put},
};
use db::models::team::{CreateTeam, CreateTeamMember, Team, UpdateTeamMember};
use serde::Deserialize;
use services::services::{auth::Identity, team::TeamService};
use ts_rs::TS;
use utils_core::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_team_middleware};

pub async fn get_teams(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Team>>>, ApiError> {
    let teams = TeamService::list_teams(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(teams)))
}

pub async fn create_team(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateTeam>,
) -> Result<ResponseJson<ApiResponse<Team>>, ApiError> {
    let team = TeamService::create_team(&state.db().pool, &identity, payload).await?;
    Ok(ResponseJson(ApiResponse::success(team)))
}

pub async fn get_team(
    Extension(team): Extension<Team>,
) -> Result<ResponseJson<ApiResponse<Team>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(team)))
}

#[derive(Debug, Deserialize, TS)]
pub struct RenameTeamRequest {
    pub name: String,
}

pub async fn rename_team(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(team): Extension<Team>,
    Json(payload): Json<RenameTeamRequest>,
) -> Result<ResponseJson<ApiResponse<Team>>, ApiError> {
    let team = TeamService::rename_team(&state.db().pool, &identity, team.id, payload.name).await?;
    Ok(ResponseJson(ApiResponse::success(team)))
}

pub async fn delete_team(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(team): Extension<Team>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    TeamService::delete_team(&state.db().pool, &identity, team.id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn add_member(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(team): Extension<Team>,
    Json(payload): Json<CreateTeamMember>,
) -> Result<ResponseJson<ApiResponse<Team>>, ApiError> {
    let team = TeamService::add_member(&state.db().pool, &identity, team.id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(team)))
}

pub async fn update_member(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    axum::extract::Path(member_id): axum::extract::Path<Uuid>,
    Json(payload): Json<UpdateTeamMember>,
) -> Result<ResponseJson<ApiResponse<Team>>, ApiError> {
    let team = TeamService::update_member(&state.db().pool, &identity, member_id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(team)))
}

pub async fn remove_member(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    axum::extract::Path(member_id): axum::extract::Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Team>>, ApiError> {
    let team = TeamService::remove_member(&state.db().pool, &identity, member_id).await?;
    Ok(ResponseJson(ApiResponse::success(team)))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let team_id_router = Router::new()
        .route("/", get(get_team))
        .route("/", put(rename_team))
        .route("/", delete(delete_team))
        .route("/members", post(add_member))
        .layer(from_fn_with_state(state.clone(), load_team_middleware::<AppState>));

    let inner = Router::new()
        .route("/", get(get_teams).post(create_team))
        .nest("/{team_id}", team_id_router);

    // Member edits are addressed by member id alone.
    Router::new()
        .nest("/teams", inner)
        .route(
            "/team-members/{member_id}",
            put(update_member).delete(remove_member),
        )
}
