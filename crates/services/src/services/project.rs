use chrono::NaiveDate;
use db::{
    TransactionTrait,
    models::project::{CreateProject, Project, ProjectError, UpdateProject},
    types::UserRole,
};
use sea_orm::{ConnectionTrait, TransactionSession};
use uuid::Uuid;

use super::{
    auth::Identity,
    dashboard::{self, ProjectSummary},
    workflow::{Result, WorkflowError},
};

fn require_manager(caller: &Identity) -> Result<()> {
    match caller.role {
        UserRole::Admin | UserRole::Pm => Ok(()),
        UserRole::Staff => Err(WorkflowError::Forbidden(
            "Only PM or admin users may manage projects",
        )),
    }
}

fn map_project_err(err: ProjectError) -> WorkflowError {
    match err {
        ProjectError::Database(err) => WorkflowError::Database(err),
        ProjectError::ProjectNotFound => WorkflowError::NotFound("Project"),
        ProjectError::TeamNotFound => WorkflowError::NotFound("Team"),
    }
}

pub struct ProjectService;

impl ProjectService {
    /// Creates the project and its team assignments as one transaction.
    /// A failed assignment rolls the project row back too.
    pub async fn create_project<C: ConnectionTrait + TransactionTrait>(
        db: &C,
        caller: &Identity,
        data: CreateProject,
    ) -> Result<Project> {
        require_manager(caller)?;
        if data.name.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "Project name must not be empty".to_string(),
            ));
        }

        let txn = db.begin().await?;
        let project = Project::create(&txn, &data, Uuid::new_v4()).await?;

        let mut seen: Vec<Uuid> = Vec::with_capacity(data.team_ids.len());
        for team_id in &data.team_ids {
            if seen.contains(team_id) {
                continue;
            }
            seen.push(*team_id);
            Project::attach_team(&txn, project.id, *team_id)
                .await
                .map_err(map_project_err)?;
        }
        txn.commit().await?;

        tracing::info!(project_id = %project.id, teams = seen.len(), "Created project");
        Project::find_by_id(db, project.id)
            .await?
            .ok_or(WorkflowError::NotFound("Project"))
    }

    pub async fn update_project<C: ConnectionTrait>(
        db: &C,
        caller: &Identity,
        project_id: Uuid,
        data: UpdateProject,
    ) -> Result<Project> {
        require_manager(caller)?;
        if let Some(name) = data.name.as_deref()
            && name.trim().is_empty()
        {
            return Err(WorkflowError::Validation(
                "Project name must not be empty".to_string(),
            ));
        }
        Project::find_by_id(db, project_id)
            .await?
            .ok_or(WorkflowError::NotFound("Project"))?;
        Ok(Project::update(db, project_id, &data).await?)
    }

    pub async fn assign_team<C: ConnectionTrait>(
        db: &C,
        caller: &Identity,
        project_id: Uuid,
        team_id: Uuid,
    ) -> Result<Project> {
        require_manager(caller)?;
        let project = Project::find_by_id(db, project_id)
            .await?
            .ok_or(WorkflowError::NotFound("Project"))?;
        if !project.team_ids.contains(&team_id) {
            Project::attach_team(db, project_id, team_id)
                .await
                .map_err(map_project_err)?;
        }
        Project::find_by_id(db, project_id)
            .await?
            .ok_or(WorkflowError::NotFound("Project"))
    }

    pub async fn unassign_team<C: ConnectionTrait>(
        db: &C,
        caller: &Identity,
        project_id: Uuid,
        team_id: Uuid,
    ) -> Result<Project> {
        require_manager(caller)?;
        Project::detach_team(db, project_id, team_id)
            .await
            .map_err(map_project_err)?;
        Project::find_by_id(db, project_id)
            .await?
            .ok_or(WorkflowError::NotFound("Project"))
    }

    pub async fn delete_project<C: ConnectionTrait>(
        db: &C,
        caller: &Identity,
        project_id: Uuid,
    ) -> Result<()> {
        require_manager(caller)?;
        let deleted = Project::delete(db, project_id).await?;
        if deleted == 0 {
            return Err(WorkflowError::NotFound("Project"));
        }
        tracing::info!(project_id = %project_id, "Deleted project");
        Ok(())
    }

    pub async fn list_projects<C: ConnectionTrait>(db: &C) -> Result<Vec<Project>> {
        Ok(Project::find_all(db).await?)
    }

    pub async fn get_project<C: ConnectionTrait>(db: &C, project_id: Uuid) -> Result<Project> {
        Project::find_by_id(db, project_id)
            .await?
            .ok_or(WorkflowError::NotFound("Project"))
    }

    pub async fn summary<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
        today: NaiveDate,
    ) -> Result<ProjectSummary> {
        Self::get_project(db, project_id).await?;
        dashboard::project_summary(db, project_id, today).await
    }
}
