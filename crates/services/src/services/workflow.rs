use db::{
    DbErr,
    models::{
        project::Project,
        task::{CreateTask, Task, UpdateTask},
    },
    types::TaskStatus,
};
use sea_orm::ConnectionTrait;
use thiserror::Error;
use uuid::Uuid;

use super::auth::{Identity, TaskAction, authorize};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Forbidden: {0}")]
    Forbidden(&'static str),
    #[error("Project has no team assigned")]
    NoTeamAssigned,
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

pub(crate) fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(WorkflowError::Validation(
            "Title must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_progress(progress: i32) -> Result<()> {
    if !(0..=100).contains(&progress) {
        return Err(WorkflowError::Validation(format!(
            "Progress must be between 0 and 100, got {progress}"
        )));
    }
    Ok(())
}

/// The single mutation path for tasks. Validation and role gating happen
/// here; the db models below carry no business rules.
pub struct TaskWorkflow;

impl TaskWorkflow {
    pub async fn create_task<C: ConnectionTrait>(
        db: &C,
        caller: &Identity,
        mut data: CreateTask,
    ) -> Result<Task> {
        if !authorize(TaskAction::Create, caller, None) {
            return Err(WorkflowError::Forbidden(
                "Only PM or admin users may create tasks",
            ));
        }
        validate_title(&data.title)?;
        if let Some(progress) = data.progress {
            validate_progress(progress)?;
        }

        let project = Project::find_by_id(db, data.project_id)
            .await?
            .ok_or(WorkflowError::NotFound("Project"))?;

        data.team_id = Some(resolve_team(&project, data.team_id)?);

        let task = Task::create(db, &data, Uuid::new_v4()).await?;
        tracing::debug!(task_id = %task.id, project_id = %project.id, "Created task");
        Ok(task)
    }

    pub async fn update_task<C: ConnectionTrait>(
        db: &C,
        caller: &Identity,
        task_id: Uuid,
        data: UpdateTask,
    ) -> Result<Task> {
        let existing = Task::find_by_id(db, task_id)
            .await?
            .ok_or(WorkflowError::NotFound("Task"))?;
        if !authorize(TaskAction::Edit, caller, existing.assignee_user_id) {
            return Err(WorkflowError::Forbidden(
                "Only the assignee, a PM or an admin may edit this task",
            ));
        }
        if let Some(title) = data.title.as_deref() {
            validate_title(title)?;
        }
        if let Some(progress) = data.progress {
            validate_progress(progress)?;
        }
        if let Some(team_id) = data.team_id {
            let project = Project::find_by_id(db, existing.project_id)
                .await?
                .ok_or(WorkflowError::NotFound("Project"))?;
            if !project.team_ids.contains(&team_id) {
                return Err(WorkflowError::Validation(
                    "Team is not assigned to this project".to_string(),
                ));
            }
        }

        Ok(Task::update(db, task_id, &data).await?)
    }

    /// Drag-driven status change. Every status pair is a legal transition;
    /// only the status column is written.
    pub async fn move_task<C: ConnectionTrait>(
        db: &C,
        caller: &Identity,
        task_id: Uuid,
        status: TaskStatus,
    ) -> Result<Task> {
        let existing = Task::find_by_id(db, task_id)
            .await?
            .ok_or(WorkflowError::NotFound("Task"))?;
        if !authorize(TaskAction::Move, caller, existing.assignee_user_id) {
            return Err(WorkflowError::Forbidden(
                "Only the assignee, a PM or an admin may move this task",
            ));
        }
        Ok(Task::update_status(db, task_id, status).await?)
    }

    pub async fn delete_task<C: ConnectionTrait>(
        db: &C,
        caller: &Identity,
        task_id: Uuid,
    ) -> Result<()> {
        let existing = Task::find_by_id(db, task_id)
            .await?
            .ok_or(WorkflowError::NotFound("Task"))?;
        if !authorize(TaskAction::Delete, caller, existing.assignee_user_id) {
            return Err(WorkflowError::Forbidden(
                "Only PM or admin users may delete tasks",
            ));
        }
        // Checklist rows go with the task via the store-level cascade.
        Task::delete(db, task_id).await?;
        tracing::debug!(task_id = %task_id, "Deleted task");
        Ok(())
    }

    pub async fn list_tasks<C: ConnectionTrait>(db: &C, project_id: Uuid) -> Result<Vec<Task>> {
        match Task::find_by_project_id(db, project_id).await {
            Ok(tasks) => Ok(tasks),
            Err(DbErr::RecordNotFound(_)) => Err(WorkflowError::NotFound("Project")),
            Err(err) => Err(err.into()),
        }
    }
}

/// Picks the explicit team when given (and checks it belongs to the
/// project), otherwise falls back to the project's first assigned team.
fn resolve_team(project: &Project, team_id: Option<Uuid>) -> Result<Uuid> {
    match team_id {
        Some(team_id) => {
            if project.team_ids.contains(&team_id) {
                Ok(team_id)
            } else {
                Err(WorkflowError::Validation(
                    "Team is not assigned to this project".to_string(),
                ))
            }
        }
        None => project
            .team_ids
            .first()
            .copied()
            .ok_or(WorkflowError::NoTeamAssigned),
    }
}

#[cfg(test)]
mod tests {
    use db::{
        models::{
            project::{CreateProject, Project},
            task_todo::{CreateTaskTodo, TaskTodo},
            team::{CreateTeam, CreateTeamMember, Team},
            user::{CreateUser, User},
        },
        types::{MemberKind, TaskPriority, UserRole},
    };
    use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
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
                members: vec![
                    CreateTeamMember {
                        user_id: pm_user.id,
                        kind: MemberKind::Pm,
                        job_role_ids: Vec::new(),
                    },
                    CreateTeamMember {
                        user_id: staff_user.id,
                        kind: MemberKind::Staff,
                        job_role_ids: Vec::new(),
                    },
                ],
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
        let project = Project::find_by_id(&db, project.id).await.unwrap().unwrap();

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

    fn create_input(fx: &Fixture) -> CreateTask {
        CreateTask::from_title(fx.project.id, "Ship the feature".to_string())
    }

    #[tokio::test]
    async fn progress_is_accepted_only_within_bounds() {
        let fx = setup().await;

        for progress in [-1, 101] {
            let mut input = create_input(&fx);
            input.progress = Some(progress);
            let err = TaskWorkflow::create_task(&fx.db, &fx.pm, input)
                .await
                .unwrap_err();
            assert!(matches!(err, WorkflowError::Validation(_)), "p={progress}");
        }

        for progress in [0, 50, 100] {
            let mut input = create_input(&fx);
            input.progress = Some(progress);
            let task = TaskWorkflow::create_task(&fx.db, &fx.pm, input)
                .await
                .unwrap();
            assert_eq!(task.progress, progress);
        }
    }

    #[tokio::test]
    async fn empty_title_is_rejected() {
        let fx = setup().await;
        let mut input = create_input(&fx);
        input.title = "   ".to_string();
        let err = TaskWorkflow::create_task(&fx.db, &fx.pm, input)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn create_resolves_default_team_from_project() {
        let fx = setup().await;
        let task = TaskWorkflow::create_task(&fx.db, &fx.pm, create_input(&fx))
            .await
            .unwrap();
        assert_eq!(task.team_id, Some(fx.team.id));
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::Medium);
    }

    #[tokio::test]
    async fn create_fails_when_project_has_no_team() {
        let fx = setup().await;
        let bare = Project::create(
            &fx.db,
            &CreateProject {
                name: "Teamless".to_string(),
                description: None,
                deadline: chrono::NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
                team_ids: Vec::new(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let input = CreateTask::from_title(bare.id, "Orphan".to_string());
        let err = TaskWorkflow::create_task(&fx.db, &fx.pm, input)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NoTeamAssigned));
    }

    #[tokio::test]
    async fn staff_may_not_create_tasks() {
        let fx = setup().await;
        let err = TaskWorkflow::create_task(&fx.db, &fx.staff, create_input(&fx))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }

    #[tokio::test]
    async fn every_status_pair_is_a_legal_move() {
        let fx = setup().await;
        let statuses = [
            TaskStatus::Todo,
            TaskStatus::InProgress,
            TaskStatus::Done,
            TaskStatus::Blocked,
        ];

        for from in statuses {
            for to in statuses {
                let mut input = create_input(&fx);
                input.status = Some(from);
                let task = TaskWorkflow::create_task(&fx.db, &fx.pm, input)
                    .await
                    .unwrap();

                let moved = TaskWorkflow::move_task(&fx.db, &fx.pm, task.id, to)
                    .await
                    .unwrap();
                assert_eq!(moved.status, to, "{from:?} -> {to:?}");

                let listed = TaskWorkflow::list_tasks(&fx.db, fx.project.id)
                    .await
                    .unwrap();
                let listed = listed.iter().find(|t| t.id == task.id).unwrap();
                assert_eq!(listed.status, to);
            }
        }
    }

    #[tokio::test]
    async fn move_only_touches_the_status_field() {
        let fx = setup().await;
        let mut input = create_input(&fx);
        input.progress = Some(40);
        input.description = Some("keep me".to_string());
        let task = TaskWorkflow::create_task(&fx.db, &fx.pm, input)
            .await
            .unwrap();

        let moved = TaskWorkflow::move_task(&fx.db, &fx.pm, task.id, TaskStatus::Done)
            .await
            .unwrap();
        assert_eq!(moved.progress, 40);
        assert_eq!(moved.description.as_deref(), Some("keep me"));
        assert_eq!(moved.team_id, task.team_id);
    }

    #[tokio::test]
    async fn staff_moves_are_gated_on_assignment() {
        let fx = setup().await;

        let mut input = create_input(&fx);
        input.assignee_user_id = Some(fx.pm.user_id);
        let other_task = TaskWorkflow::create_task(&fx.db, &fx.pm, input)
            .await
            .unwrap();

        let err =
            TaskWorkflow::move_task(&fx.db, &fx.staff, other_task.id, TaskStatus::InProgress)
                .await
                .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        let mut input = create_input(&fx);
        input.assignee_user_id = Some(fx.staff.user_id);
        let own_task = TaskWorkflow::create_task(&fx.db, &fx.pm, input)
            .await
            .unwrap();

        let moved = TaskWorkflow::move_task(&fx.db, &fx.staff, own_task.id, TaskStatus::Done)
            .await
            .unwrap();
        assert_eq!(moved.status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn deleting_a_task_cascades_to_its_todos() {
        let fx = setup().await;
        let task = TaskWorkflow::create_task(&fx.db, &fx.pm, create_input(&fx))
            .await
            .unwrap();

        for title in ["first", "second"] {
            TaskTodo::create(
                &fx.db,
                task.id,
                &CreateTaskTodo {
                    title: title.to_string(),
                    status: None,
                    assignee_user_id: None,
                    evidence: None,
                    due_date: None,
                },
                Uuid::new_v4(),
            )
            .await
            .unwrap();
        }

        TaskWorkflow::delete_task(&fx.db, &fx.pm, task.id)
            .await
            .unwrap();

        let remaining = db::entities::task_todo::Entity::find()
            .count(&fx.db)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn update_mirrors_nullable_fields_and_keeps_the_rest() {
        let fx = setup().await;
        let mut input = create_input(&fx);
        input.description = Some("first draft".to_string());
        input.progress = Some(40);
        input.due_date = chrono::NaiveDate::from_ymd_opt(2026, 11, 1);
        let task = TaskWorkflow::create_task(&fx.db, &fx.pm, input)
            .await
            .unwrap();
        assert_eq!(task.team_id, Some(fx.team.id));

        let updated = TaskWorkflow::update_task(
            &fx.db,
            &fx.pm,
            task.id,
            UpdateTask {
                title: None,
                description: None,
                status: None,
                priority: None,
                team_id: None,
                assignee_user_id: None,
                due_date: None,
                progress: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.title, task.title);
        assert_eq!(updated.status, task.status);
        assert_eq!(updated.priority, task.priority);
        assert_eq!(updated.progress, 40);
        assert_eq!(updated.description, None);
        assert_eq!(updated.team_id, None);
        assert_eq!(updated.assignee_user_id, None);
        assert_eq!(updated.due_date, None);
    }

    #[tokio::test]
    async fn update_rejects_team_outside_the_project() {
        let fx = setup().await;
        let task = TaskWorkflow::create_task(&fx.db, &fx.pm, create_input(&fx))
            .await
            .unwrap();

        let stray_team = Team::create(
            &fx.db,
            &CreateTeam {
                name: "Elsewhere".to_string(),
                members: Vec::new(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let err = TaskWorkflow::update_task(
            &fx.db,
            &fx.pm,
            task.id,
            UpdateTask {
                title: None,
                description: None,
                status: None,
                priority: None,
                team_id: Some(stray_team.id),
                assignee_user_id: None,
                due_date: None,
                progress: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_task_reports_not_found() {
        let fx = setup().await;
        let err = TaskWorkflow::move_task(&fx.db, &fx.pm, Uuid::new_v4(), TaskStatus::Done)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound("Task")));
    }
}
