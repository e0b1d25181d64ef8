use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{delete, get, post, put},
};
use chrono::{NaiveDate, Utc};
use db::models::project::{CreateProject, Project, UpdateProject};
use serde::Deserialize;
use services::services::{
    auth::Identity,
    dashboard::ProjectSummary,
    project::ProjectService,
};
use ts_rs::TS;
use utils_core::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_project_middleware};

pub async fn get_projects(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Project>>>, ApiError> {
    let projects = ProjectService::list_projects(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(projects)))
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    let project = ProjectService::create_project(&state.db().pool, &identity, payload).await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn get_project(
    Extension(project): Extension<Project>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(project): Extension<Project>,
    Json(payload): Json<UpdateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    let project =
        ProjectService::update_project(&state.db().pool, &identity, project.id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(project): Extension<Project>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    ProjectService::delete_project(&state.db().pool, &identity, project.id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

#[derive(Debug, Deserialize, TS)]
pub struct TeamAssignmentRequest {
    pub team_id: Uuid,
}

pub async fn assign_team(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(project): Extension<Project>,
    Json(payload): Json<TeamAssignmentRequest>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    let project =
        ProjectService::assign_team(&state.db().pool, &identity, project.id, payload.team_id)
            .await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn unassign_team(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(project): Extension<Project>,
    Json(payload): Json<TeamAssignmentRequest>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    let project =
        ProjectService::unassign_team(&state.db().pool, &identity, project.id, payload.team_id)
            .await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub date: Option<NaiveDate>,
}

pub async fn project_summary(
    State(state): State<AppState>,
    Extension(project): Extension<Project>,
    Query(query): Query<SummaryQuery>,
) -> Result<ResponseJson<ApiResponse<ProjectSummary>>, ApiError> {
    let today = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let summary = ProjectService::summary(&state.db().pool, project.id, today).await?;
    Ok(ResponseJson(ApiResponse::success(summary)))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let project_id_router = Router::new()
        .route("/", get(get_project))
        .route("/", put(update_project))
        .route("/", delete(delete_project))
        .route("/summary", get(project_summary))
        .route("/teams", post(assign_team).delete(unassign_team))
        .layer(from_fn_with_state(state.clone(), load_project_middleware::<AppState>));

    let inner = Router::new()
        .route("/", get(get_projects).post(create_project))
        .nest("/{project_id}", project_id_router);

    Router::new().nest("/projects", inner)
}
