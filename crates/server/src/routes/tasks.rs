use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{delete, get, post, put},
};
use db::{
    models::{
        task::{CreateTask, Task, UpdateTask},
        task_todo::{CreateTaskTodo, TaskTodo},
    },
    types::TaskStatus,
};
use serde::{Deserialize, Serialize};
use services::services::{
    auth::Identity,
    todo::TodoWorkflow,
    workflow::TaskWorkflow,
};
use ts_rs::TS;
use utils_core::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_task_middleware};

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskQuery {
    pub project_id: Option<Uuid>,
}

pub async fn get_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Task>>>, ApiError> {
    let tasks = match query.project_id {
        Some(project_id) => TaskWorkflow::list_tasks(&state.db().pool, project_id).await?,
        None => Task::find_all(&state.db().pool).await?,
    };
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    tracing::debug!(
        "Creating task '{}' in project {}",
        payload.title,
        payload.project_id
    );
    let task = TaskWorkflow::create_task(&state.db().pool, &identity, payload).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn get_task(
    Extension(task): Extension<Task>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(existing_task): Extension<Task>,
    Json(payload): Json<UpdateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task =
        TaskWorkflow::update_task(&state.db().pool, &identity, existing_task.id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

#[derive(Debug, Deserialize, TS)]
pub struct MoveTaskRequest {
    pub status: TaskStatus,
}

pub async fn move_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(task): Extension<Task>,
    Json(payload): Json<MoveTaskRequest>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task =
        TaskWorkflow::move_task(&state.db().pool, &identity, task.id, payload.status).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Extension(task): Extension<Task>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    TaskWorkflow::delete_task(&state.db().pool, &identity, task.id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn get_todos(
    State(state): State<AppState>,
    Extension(task): Extension<Task>,
) -> Result<ResponseJson<ApiResponse<Vec<TaskTodo>>>, ApiError> {
    let todos = TodoWorkflow::list_todos(&state.db().pool, task.id).await?;
    Ok(ResponseJson(ApiResponse::success(todos)))
}

pub async fn create_todo(
    State(state): State<AppState>,
    Extension(task): Extension<Task>,
    Json(payload): Json<CreateTaskTodo>,
) -> Result<ResponseJson<ApiResponse<TaskTodo>>, ApiError> {
    let todo = TodoWorkflow::add_todo(&state.db().pool, task.id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(todo)))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let task_id_router = Router::new()
        .route("/", get(get_task))
        .route("/", put(update_task))
        .route("/", delete(delete_task))
        .route("/move", post(move_task))
        .route("/todos", get(get_todos).post(create_todo))
        .layer(from_fn_with_state(state.clone(), load_task_middleware::<AppState>));

    let inner = Router::new()
        .route("/", get(get_tasks).post(create_task))
        .nest("/{task_id}", task_id_router);

    Router::new().nest("/tasks", inner)
}
