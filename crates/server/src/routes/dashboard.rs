use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use services::services::{
    dashboard::{self, ProjectSummary},
    project::ProjectService,
};
use utils_core::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub date: Option<NaiveDate>,
}

/// Per-project summaries across the whole workspace, newest project first.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<ProjectSummary>>>, ApiError> {
    let today = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let projects = ProjectService::list_projects(&state.db().pool).await?;

    let mut summaries = Vec::with_capacity(projects.len());
    for project in projects {
        summaries.push(dashboard::project_summary(&state.db().pool, project.id, today).await?);
    }
    Ok(ResponseJson(ApiResponse::success(summaries)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}
