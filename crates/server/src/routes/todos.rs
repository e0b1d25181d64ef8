use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{delete, post, put},
};
use db::{
    models::task_todo::{TaskTodo, UpdateTaskTodo},
    types::TodoStatus,
};
use serde::Deserialize;
use services::services::todo::TodoWorkflow;
use ts_rs::TS;
use utils_core::response::ApiResponse;

use crate::{AppState, error::ApiError, middleware::load_todo_middleware};

pub async fn update_todo(
    State(state): State<AppState>,
    Extension(todo): Extension<TaskTodo>,
    Json(payload): Json<UpdateTaskTodo>,
) -> Result<ResponseJson<ApiResponse<TaskTodo>>, ApiError> {
    let todo = TodoWorkflow::edit_todo(&state.db().pool, todo.id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(todo)))
}

#[derive(Debug, Deserialize, TS)]
pub struct SetTodoStatusRequest {
    pub status: TodoStatus,
}

pub async fn set_todo_status(
    State(state): State<AppState>,
    Extension(todo): Extension<TaskTodo>,
    Json(payload): Json<SetTodoStatusRequest>,
) -> Result<ResponseJson<ApiResponse<TaskTodo>>, ApiError> {
    let todo = TodoWorkflow::set_todo_status(&state.db().pool, todo.id, payload.status).await?;
    Ok(ResponseJson(ApiResponse::success(todo)))
}

#[derive(Debug, Deserialize, TS)]
pub struct ToggleTodoRequest {
    pub checked: bool,
}

pub async fn toggle_todo(
    State(state): State<AppState>,
    Extension(todo): Extension<TaskTodo>,
    Json(payload): Json<ToggleTodoRequest>,
) -> Result<ResponseJson<ApiResponse<TaskTodo>>, ApiError> {
    let todo = TodoWorkflow::toggle_todo(&state.db().pool, todo.id, payload.checked).await?;
    Ok(ResponseJson(ApiResponse::success(todo)))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(todo): Extension<TaskTodo>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    TodoWorkflow::delete_todo(&state.db().pool, todo.id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let todo_id_router = Router::new()
        .route("/", put(update_todo))
        .route("/", delete(delete_todo))
        .route("/status", post(set_todo_status))
        .route("/toggle", post(toggle_todo))
        .layer(from_fn_with_state(state.clone(), load_todo_middleware::<AppState>));

    Router::new().nest("/todos/{todo_id}", todo_id_router)
}
