//! Board-side task cache with confirm-then-apply semantics.
//!
//! The store never mutates its task list speculatively. Every mutation is
//! sent through the workflow engine first; the cache applies the record the
//! engine returns, so a rejected call leaves the board exactly as it was.

use db::{
    models::task::{CreateTask, Task, UpdateTask},
    types::TaskStatus,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use services::services::{
    auth::Identity,
    workflow::{TaskWorkflow, WorkflowError},
};
use ts_rs::TS;
use uuid::Uuid;

/// Snapshot of the board for one project.
#[derive(Debug, Clone, Default, Serialize, TS)]
pub struct BoardState {
    pub tasks: Vec<Task>,
    pub loading: bool,
    pub error: Option<String>,
}

/// State transitions applied by the reducer. Mutation variants carry the
/// server-confirmed record, never the client's guess.
#[derive(Debug, Clone)]
pub enum BoardAction {
    SetTasks(Vec<Task>),
    AddTask(Task),
    UpdateTask(Task),
    DeleteTask(Uuid),
    SetLoading(bool),
    SetError(Option<String>),
}

/// Pure reducer. Unknown ids in `UpdateTask`/`DeleteTask` are no-ops.
pub fn reduce(state: &mut BoardState, action: BoardAction) {
    match action {
        BoardAction::SetTasks(tasks) => {
            state.tasks = tasks;
            state.error = None;
        }
        BoardAction::AddTask(task) => state.tasks.push(task),
        BoardAction::UpdateTask(task) => {
            if let Some(slot) = state.tasks.iter_mut().find(|t| t.id == task.id) {
                *slot = task;
            }
        }
        BoardAction::DeleteTask(task_id) => state.tasks.retain(|t| t.id != task_id),
        BoardAction::SetLoading(loading) => state.loading = loading,
        BoardAction::SetError(error) => state.error = error,
    }
}

/// Dispatching facade bound to one project and one caller.
pub struct BoardStore {
    db: DatabaseConnection,
    caller: Identity,
    project_id: Uuid,
    state: BoardState,
}

impl BoardStore {
    pub fn new(db: DatabaseConnection, caller: Identity, project_id: Uuid) -> Self {
        Self {
            db,
            caller,
            project_id,
            state: BoardState::default(),
        }
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Full reload from the engine, used on first bind and when switching
    /// projects.
    pub async fn refresh(&mut self) -> Result<(), WorkflowError> {
        reduce(&mut self.state, BoardAction::SetLoading(true));
        let result = TaskWorkflow::list_tasks(&self.db, self.project_id).await;
        reduce(&mut self.state, BoardAction::SetLoading(false));
        match result {
            Ok(tasks) => {
                reduce(&mut self.state, BoardAction::SetTasks(tasks));
                Ok(())
            }
            Err(err) => {
                reduce(&mut self.state, BoardAction::SetError(Some(err.to_string())));
                Err(err)
            }
        }
    }

    /// Rebinds the store to another project and reloads.
    pub async fn bind_project(&mut self, project_id: Uuid) -> Result<(), WorkflowError> {
        self.project_id = project_id;
        reduce(&mut self.state, BoardAction::SetTasks(Vec::new()));
        self.refresh().await
    }

    pub async fn create_task(&mut self, mut data: CreateTask) -> Result<Task, WorkflowError> {
        data.project_id = self.project_id;
        let task = Self::confirm(
            &mut self.state,
            TaskWorkflow::create_task(&self.db, &self.caller, data),
        )
        .await?;
        reduce(&mut self.state, BoardAction::AddTask(task.clone()));
        Ok(task)
    }

    pub async fn update_task(
        &mut self,
        task_id: Uuid,
        data: UpdateTask,
    ) -> Result<Task, WorkflowError> {
        let task = Self::confirm(
            &mut self.state,
            TaskWorkflow::update_task(&self.db, &self.caller, task_id, data),
        )
        .await?;
        reduce(&mut self.state, BoardAction::UpdateTask(task.clone()));
        Ok(task)
    }

    /// Column drag. The card moves only after the engine confirms the write.
    pub async fn move_task(
        &mut self,
        task_id: Uuid,
        status: TaskStatus,
    ) -> Result<Task, WorkflowError> {
        let task = Self::confirm(
            &mut self.state,
            TaskWorkflow::move_task(&self.db, &self.caller, task_id, status),
        )
        .await?;
        reduce(&mut self.state, BoardAction::UpdateTask(task.clone()));
        Ok(task)
    }

    pub async fn delete_task(&mut self, task_id: Uuid) -> Result<(), WorkflowError> {
        Self::confirm(
            &mut self.state,
            TaskWorkflow::delete_task(&self.db, &self.caller, task_id),
        )
        .await?;
        reduce(&mut self.state, BoardAction::DeleteTask(task_id));
        Ok(())
    }

    /// Shared loading/error bookkeeping around an engine call. On failure the
    /// task list is untouched; only the error slot changes.
    async fn confirm<T>(
        state: &mut BoardState,
        fut: impl Future<Output = Result<T, WorkflowError>>,
    ) -> Result<T, WorkflowError> {
        reduce(state, BoardAction::SetLoading(true));
        let result = fut.await;
        reduce(state, BoardAction::SetLoading(false));
        match result {
            Ok(value) => {
                reduce(state, BoardAction::SetError(None));
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(error = %err, "Board mutation rejected");
                reduce(state, BoardAction::SetError(Some(err.to_string())));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use db::{
        models::{
            project::{CreateProject, Project},
            team::{CreateTeam, CreateTeamMember, Team},
            user::{CreateUser, User},
        },
        types::{MemberKind, UserRole},
    };
    use sea_orm_migration::MigratorTrait;

    use super::*;

    struct Fixture {
        db: DatabaseConnection,
        pm: Identity,
        staff: Identity,
        project: Project,
        team: Team,
    }

    async fn setup() -> Fixture {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();

        let pm_user = User::create(
            &db,
            &CreateUser {
                name: "Priya".to_string(),
                email: "priya@example.com".to_string(),
                role: UserRole::Pm,
                credential: "x".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        let staff_user = User::create(
            &db,
            &CreateUser {
                name: "Sam".to_string(),
                email: "sam@example.com".to_string(),
                role: UserRole::Staff,
                credential: "x".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let team = Team::create(
            &db,
            &CreateTeam {
                name: "Platform".to_string(),
                members: vec![CreateTeamMember {
                    user_id: pm_user.id,
                    kind: MemberKind::Pm,
                    job_role_ids: Vec::new(),
                }],
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let project = Project::create(
            &db,
            &CreateProject {
                name: "Launch".to_string(),
                description: None,
                deadline: chrono::NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
                team_ids: vec![team.id],
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        Project::attach_team(&db, project.id, team.id).await.unwrap();

        Fixture {
            db,
            pm: Identity {
                user_id: pm_user.id,
                role: UserRole::Pm,
            },
            staff: Identity {
                user_id: staff_user.id,
                role: UserRole::Staff,
            },
            project,
            team,
        }
    }

    #[tokio::test]
    async fn created_card_carries_the_server_resolved_team() {
        let fx = setup().await;
        let mut store = BoardStore::new(fx.db.clone(), fx.pm.clone(), fx.project.id);
        store.refresh().await.unwrap();

        let input = CreateTask::from_title(fx.project.id, "Ship it".to_string());
        let task = store.create_task(input).await.unwrap();

        assert_eq!(task.team_id, Some(fx.team.id));
        assert_eq!(store.state().tasks.len(), 1);
        assert_eq!(store.state().tasks[0].team_id, Some(fx.team.id));
        assert!(store.state().error.is_none());
        assert!(!store.state().loading);
    }

    #[tokio::test]
    async fn rejected_mutation_leaves_the_board_untouched() {
        let fx = setup().await;
        let mut pm_store = BoardStore::new(fx.db.clone(), fx.pm.clone(), fx.project.id);
        let task = pm_store
            .create_task(CreateTask::from_title(fx.project.id, "Locked".to_string()))
            .await
            .unwrap();

        let mut staff_store = BoardStore::new(fx.db.clone(), fx.staff.clone(), fx.project.id);
        staff_store.refresh().await.unwrap();
        let before = staff_store.state().tasks.clone();

        let err = staff_store
            .move_task(task.id, TaskStatus::Done)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        let state = staff_store.state();
        assert_eq!(state.tasks.len(), before.len());
        assert_eq!(state.tasks[0].status, before[0].status);
        assert!(state.error.is_some());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn confirmed_move_updates_the_cached_card() {
        let fx = setup().await;
        let mut store = BoardStore::new(fx.db.clone(), fx.pm.clone(), fx.project.id);
        let task = store
            .create_task(CreateTask::from_title(fx.project.id, "Drag me".to_string()))
            .await
            .unwrap();

        store.move_task(task.id, TaskStatus::InProgress).await.unwrap();
        assert_eq!(store.state().tasks[0].status, TaskStatus::InProgress);

        store.delete_task(task.id).await.unwrap();
        assert!(store.state().tasks.is_empty());
    }

    #[tokio::test]
    async fn created_cards_append_to_the_list() {
        let fx = setup().await;
        let mut store = BoardStore::new(fx.db.clone(), fx.pm.clone(), fx.project.id);
        store.refresh().await.unwrap();

        let first = store
            .create_task(CreateTask::from_title(fx.project.id, "First".to_string()))
            .await
            .unwrap();
        let second = store
            .create_task(CreateTask::from_title(fx.project.id, "Second".to_string()))
            .await
            .unwrap();

        let ids: Vec<Uuid> = store.state().tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn bind_project_replaces_the_task_list() {
        let fx = setup().await;
        let mut store = BoardStore::new(fx.db.clone(), fx.pm.clone(), fx.project.id);
        store
            .create_task(CreateTask::from_title(fx.project.id, "Old".to_string()))
            .await
            .unwrap();

        let other = Project::create(
            &fx.db,
            &CreateProject {
                name: "Second".to_string(),
                description: None,
                deadline: chrono::NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
                team_ids: Vec::new(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        Project::attach_team(&fx.db, other.id, fx.team.id)
            .await
            .unwrap();

        store.bind_project(other.id).await.unwrap();
        assert!(store.state().tasks.is_empty());
    }
}
