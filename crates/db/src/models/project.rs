use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::{
    entities::{project, project_team},
    models::ids,
};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Project not found")]
    ProjectNotFound,
    #[error("Team not found")]
    TeamNotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub deadline: NaiveDate,
    pub team_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub team_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<NaiveDate>,
}

impl Project {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        model: project::Model,
    ) -> Result<Self, DbErr> {
        let team_ids = Self::team_ids_by_row_id(db, model.id).await?;
        Ok(Self {
            id: model.uuid,
            name: model.name,
            description: model.description,
            deadline: model.deadline,
            team_ids,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    async fn team_ids_by_row_id<C: ConnectionTrait>(
        db: &C,
        project_row_id: i64,
    ) -> Result<Vec<Uuid>, DbErr> {
        let team_row_ids: Vec<i64> = project_team::Entity::find()
            .select_only()
            .column(project_team::Column::TeamId)
            .filter(project_team::Column::ProjectId.eq(project_row_id))
            .order_by_asc(project_team::Column::Id)
            .into_tuple()
            .all(db)
            .await?;

        let mut team_ids = Vec::with_capacity(team_row_ids.len());
        for team_row_id in team_row_ids {
            let team_id = ids::team_uuid_by_id(db, team_row_id)
                .await?
                .ok_or(DbErr::RecordNotFound("Team not found".to_string()))?;
            team_ids.push(team_id);
        }
        Ok(team_ids)
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let records = project::Entity::find()
            .order_by_desc(project::Column::CreatedAt)
            .all(db)
            .await?;
        let mut projects = Vec::with_capacity(records.len());
        for record in records {
            projects.push(Self::from_model(db, record).await?);
        }
        Ok(projects)
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<Self>, DbErr> {
        let record = project::Entity::find()
            .filter(project::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    /// Inserts the project row alone; team assignments go through
    /// `attach_team` inside the same transaction.
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateProject,
        project_id: Uuid,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = project::ActiveModel {
            uuid: Set(project_id),
            name: Set(data.name.clone()),
            description: Set(data.description.clone()),
            deadline: Set(data.deadline),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Self::from_model(db, model).await
    }

    pub async fn attach_team<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
        team_id: Uuid,
    ) -> Result<(), ProjectError> {
        let project_row_id = ids::project_id_by_uuid(db, project_id)
            .await?
            .ok_or(ProjectError::ProjectNotFound)?;
        let team_row_id = ids::team_id_by_uuid(db, team_id)
            .await?
            .ok_or(ProjectError::TeamNotFound)?;
        let active = project_team::ActiveModel {
            project_id: Set(project_row_id),
            team_id: Set(team_row_id),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };
        active.insert(db).await?;
        Ok(())
    }

    pub async fn detach_team<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
        team_id: Uuid,
    ) -> Result<u64, ProjectError> {
        let project_row_id = ids::project_id_by_uuid(db, project_id)
            .await?
            .ok_or(ProjectError::ProjectNotFound)?;
        let team_row_id = ids::team_id_by_uuid(db, team_id)
            .await?
            .ok_or(ProjectError::TeamNotFound)?;
        let result = project_team::Entity::delete_many()
            .filter(project_team::Column::ProjectId.eq(project_row_id))
            .filter(project_team::Column::TeamId.eq(team_row_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        payload: &UpdateProject,
    ) -> Result<Self, DbErr> {
        let record = project::Entity::find()
            .filter(project::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;

        let mut active: project::ActiveModel = record.into();
        if let Some(name) = payload.name.clone() {
            active.name = Set(name);
        }
        if payload.description.is_some() {
            active.description = Set(payload.description.clone());
        }
        if let Some(deadline) = payload.deadline {
            active.deadline = Set(deadline);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Self::from_model(db, updated).await
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = project::Entity::delete_many()
            .filter(project::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
