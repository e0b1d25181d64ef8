use db::{
    models::{
        task::Task,
        task_todo::{CreateTaskTodo, TaskTodo, UpdateTaskTodo},
    },
    types::TodoStatus,
};
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use super::workflow::{Result, WorkflowError, validate_title};

/// Checklist engine scoped under a parent task. Checklists are open to any
/// signed-in user; the session layer is the only gate.
pub struct TodoWorkflow;

impl TodoWorkflow {
    pub async fn list_todos<C: ConnectionTrait>(db: &C, task_id: Uuid) -> Result<Vec<TaskTodo>> {
        Self::load_task(db, task_id).await?;
        Ok(TaskTodo::find_by_task_id(db, task_id).await?)
    }

    pub async fn add_todo<C: ConnectionTrait>(
        db: &C,
        task_id: Uuid,
        data: CreateTaskTodo,
    ) -> Result<TaskTodo> {
        Self::load_task(db, task_id).await?;
        validate_title(&data.title)?;
        let todo = TaskTodo::create(db, task_id, &data, Uuid::new_v4()).await?;
        tracing::debug!(todo_id = %todo.id, task_id = %task_id, "Added checklist entry");
        Ok(todo)
    }

    pub async fn edit_todo<C: ConnectionTrait>(
        db: &C,
        todo_id: Uuid,
        data: UpdateTaskTodo,
    ) -> Result<TaskTodo> {
        TaskTodo::find_by_id(db, todo_id)
            .await?
            .ok_or(WorkflowError::NotFound("Todo"))?;
        if let Some(title) = data.title.as_deref() {
            validate_title(title)?;
        }
        Ok(TaskTodo::update(db, todo_id, &data).await?)
    }

    /// Idempotent status write. Completing every todo never touches the
    /// parent task; closing the task stays an explicit move.
    pub async fn set_todo_status<C: ConnectionTrait>(
        db: &C,
        todo_id: Uuid,
        status: TodoStatus,
    ) -> Result<TaskTodo> {
        TaskTodo::find_by_id(db, todo_id)
            .await?
            .ok_or(WorkflowError::NotFound("Todo"))?;
        Ok(TaskTodo::update_status(db, todo_id, status).await?)
    }

    /// Checkbox semantics: checked marks the todo done, unchecked reopens it.
    pub async fn toggle_todo<C: ConnectionTrait>(
        db: &C,
        todo_id: Uuid,
        checked: bool,
    ) -> Result<TaskTodo> {
        let status = if checked {
            TodoStatus::Done
        } else {
            TodoStatus::Todo
        };
        Self::set_todo_status(db, todo_id, status).await
    }

    pub async fn delete_todo<C: ConnectionTrait>(db: &C, todo_id: Uuid) -> Result<()> {
        TaskTodo::find_by_id(db, todo_id)
            .await?
            .ok_or(WorkflowError::NotFound("Todo"))?;
        TaskTodo::delete(db, todo_id).await?;
        Ok(())
    }

    async fn load_task<C: ConnectionTrait>(db: &C, task_id: Uuid) -> Result<Task> {
        Task::find_by_id(db, task_id)
            .await?
            .ok_or(WorkflowError::NotFound("Task"))
    }
}
