use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::{entities::task_todo, models::ids, types::TodoStatus};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct TaskTodo {
    pub id: Uuid,
    pub task_id: Uuid,
    pub assignee_user_id: Option<Uuid>,
    pub title: String,
    pub status: TodoStatus,
    pub evidence: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTaskTodo {
    pub title: String,
    pub status: Option<TodoStatus>,
    pub assignee_user_id: Option<Uuid>,
    pub evidence: Option<String>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateTaskTodo {
    pub title: Option<String>,
    pub status: Option<TodoStatus>,
    pub assignee_user_id: Option<Uuid>,
    pub evidence: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl TaskTodo {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        model: task_todo::Model,
    ) -> Result<Self, DbErr> {
        let task_id = ids::task_uuid_by_id(db, model.task_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Task not found".to_string()))?;
        let assignee_user_id = match model.assignee_user_id {
            Some(id) => ids::user_uuid_by_id(db, id)
                .await?
                .ok_or(DbErr::RecordNotFound("User not found".to_string()))
                .map(Some)?,
            None => None,
        };
        Ok(Self {
            id: model.uuid,
            task_id,
            assignee_user_id,
            title: model.title,
            status: model.status,
            evidence: model.evidence,
            due_date: model.due_date,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    /// Checklist entries for a task, oldest first (id ascending).
    pub async fn find_by_task_id<C: ConnectionTrait>(
        db: &C,
        task_id: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        let task_row_id = ids::task_id_by_uuid(db, task_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Task not found".to_string()))?;

        let models = task_todo::Entity::find()
            .filter(task_todo::Column::TaskId.eq(task_row_id))
            .order_by_asc(task_todo::Column::Id)
            .all(db)
            .await?;

        let mut todos = Vec::with_capacity(models.len());
        for model in models {
            todos.push(Self::from_model(db, model).await?);
        }
        Ok(todos)
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<Self>, DbErr> {
        let record = task_todo::Entity::find()
            .filter(task_todo::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        task_id: Uuid,
        data: &CreateTaskTodo,
        todo_id: Uuid,
    ) -> Result<Self, DbErr> {
        let task_row_id = ids::task_id_by_uuid(db, task_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Task not found".to_string()))?;
        let assignee_row_id = match data.assignee_user_id {
            Some(id) => ids::user_id_by_uuid(db, id)
                .await?
                .ok_or(DbErr::RecordNotFound("User not found".to_string()))
                .map(Some)?,
            None => None,
        };

        let now = Utc::now();
        let active = task_todo::ActiveModel {
            uuid: Set(todo_id),
            task_id: Set(task_row_id),
            assignee_user_id: Set(assignee_row_id),
            title: Set(data.title.clone()),
            status: Set(data.status.unwrap_or_default()),
            evidence: Set(data.evidence.clone()),
            due_date: Set(data.due_date),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Self::from_model(db, model).await
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        data: &UpdateTaskTodo,
    ) -> Result<Self, DbErr> {
        let record = task_todo::Entity::find()
            .filter(task_todo::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Todo not found".to_string()))?;

        let assignee_row_id = match data.assignee_user_id {
            Some(id) => ids::user_id_by_uuid(db, id)
                .await?
                .ok_or(DbErr::RecordNotFound("User not found".to_string()))
                .map(Some)?,
            None => None,
        };

        let mut active: task_todo::ActiveModel = record.into();
        if let Some(title) = data.title.clone() {
            active.title = Set(title);
        }
        if let Some(status) = data.status {
            active.status = Set(status);
        }
        active.assignee_user_id = Set(assignee_row_id);
        active.evidence = Set(data.evidence.clone());
        active.due_date = Set(data.due_date);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Self::from_model(db, updated).await
    }

    /// Status-only fast path for checkbox toggles.
    pub async fn update_status<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        status: TodoStatus,
    ) -> Result<Self, DbErr> {
        let record = task_todo::Entity::find()
            .filter(task_todo::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Todo not found".to_string()))?;
        let mut active: task_todo::ActiveModel = record.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(db).await?;
        Self::from_model(db, updated).await
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = task_todo::Entity::delete_many()
            .filter(task_todo::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
