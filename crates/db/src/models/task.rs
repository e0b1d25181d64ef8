use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::{
    entities::task,
    models::ids,
    types::{TaskPriority, TaskStatus},
};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,
    pub team_id: Option<Uuid>,
    pub assignee_user_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub progress: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub team_id: Option<Uuid>,
    pub assignee_user_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub progress: Option<i32>,
}

impl CreateTask {
    pub fn from_title(project_id: Uuid, title: String) -> Self {
        Self {
            project_id,
            team_id: None,
            assignee_user_id: None,
            title,
            description: None,
            status: Some(TaskStatus::Todo),
            priority: None,
            due_date: None,
            progress: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub team_id: Option<Uuid>,
    pub assignee_user_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub progress: Option<i32>,
}

impl Task {
    async fn from_model<C: ConnectionTrait>(db: &C, model: task::Model) -> Result<Self, DbErr> {
        let project_id = ids::project_uuid_by_id(db, model.project_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;
        let team_id = match model.team_id {
            Some(id) => ids::team_uuid_by_id(db, id)
                .await?
                .ok_or(DbErr::RecordNotFound("Team not found".to_string()))
                .map(Some)?,
            None => None,
        };
        let assignee_user_id = match model.assignee_user_id {
            Some(id) => ids::user_uuid_by_id(db, id)
                .await?
                .ok_or(DbErr::RecordNotFound("User not found".to_string()))
                .map(Some)?,
            None => None,
        };

        Ok(Self {
            id: model.uuid,
            project_id,
            team_id,
            assignee_user_id,
            title: model.title,
            description: model.description,
            status: model.status,
            priority: model.priority,
            due_date: model.due_date,
            progress: model.progress,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let models = task::Entity::find()
            .order_by_desc(task::Column::CreatedAt)
            .all(db)
            .await?;
        let mut tasks = Vec::with_capacity(models.len());
        for model in models {
            tasks.push(Self::from_model(db, model).await?);
        }
        Ok(tasks)
    }

    pub async fn find_by_project_id<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        let project_row_id = ids::project_id_by_uuid(db, project_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;

        let models = task::Entity::find()
            .filter(task::Column::ProjectId.eq(project_row_id))
            .order_by_desc(task::Column::CreatedAt)
            .all(db)
            .await?;

        let mut tasks = Vec::with_capacity(models.len());
        for model in models {
            tasks.push(Self::from_model(db, model).await?);
        }
        Ok(tasks)
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<Self>, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateTask,
        task_id: Uuid,
    ) -> Result<Self, DbErr> {
        let project_row_id = ids::project_id_by_uuid(db, data.project_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;
        let team_row_id = match data.team_id {
            Some(id) => ids::team_id_by_uuid(db, id)
                .await?
                .ok_or(DbErr::RecordNotFound("Team not found".to_string()))
                .map(Some)?,
            None => None,
        };
        let assignee_row_id = match data.assignee_user_id {
            Some(id) => ids::user_id_by_uuid(db, id)
                .await?
                .ok_or(DbErr::RecordNotFound("User not found".to_string()))
                .map(Some)?,
            None => None,
        };

        let now = Utc::now();
        let active = task::ActiveModel {
            uuid: Set(task_id),
            project_id: Set(project_row_id),
            team_id: Set(team_row_id),
            assignee_user_id: Set(assignee_row_id),
            title: Set(data.title.clone()),
            description: Set(data.description.clone()),
            status: Set(data.status.unwrap_or_default()),
            priority: Set(data.priority.unwrap_or_default()),
            due_date: Set(data.due_date),
            progress: Set(data.progress.unwrap_or(0)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Self::from_model(db, model).await
    }

    /// Edit-form write. Nullable columns (`description`, `team_id`,
    /// `assignee_user_id`, `due_date`) mirror the payload exactly, so an
    /// absent field clears the column. Non-nullable columns keep their
    /// current value when the payload omits them.
    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        data: &UpdateTask,
    ) -> Result<Self, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Task not found".to_string()))?;

        let team_row_id = match data.team_id {
            Some(id) => ids::team_id_by_uuid(db, id)
                .await?
                .ok_or(DbErr::RecordNotFound("Team not found".to_string()))
                .map(Some)?,
            None => None,
        };
        let assignee_row_id = match data.assignee_user_id {
            Some(id) => ids::user_id_by_uuid(db, id)
                .await?
                .ok_or(DbErr::RecordNotFound("User not found".to_string()))
                .map(Some)?,
            None => None,
        };

        let mut active: task::ActiveModel = record.into();
        if let Some(title) = data.title.clone() {
            active.title = Set(title);
        }
        active.description = Set(data.description.clone());
        if let Some(status) = data.status {
            active.status = Set(status);
        }
        if let Some(priority) = data.priority {
            active.priority = Set(priority);
        }
        active.team_id = Set(team_row_id);
        active.assignee_user_id = Set(assignee_row_id);
        active.due_date = Set(data.due_date);
        if let Some(progress) = data.progress {
            active.progress = Set(progress);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Self::from_model(db, updated).await
    }

    /// Status-only write used by board drag moves; no other field is touched.
    pub async fn update_status<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Self, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Task not found".to_string()))?;
        let mut active: task::ActiveModel = record.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(db).await?;
        Self::from_model(db, updated).await
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = task::Entity::delete_many()
            .filter(task::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
