use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Users::Table)
                    .col(pk_id_col(manager, Users::Id))
                    .col(uuid_col(Users::Uuid))
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("staff")),
                    )
                    .col(ColumnDef::new(Users::Credential).string().not_null())
                    .col(timestamp_col(Users::CreatedAt))
                    .col(timestamp_col(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_uuid")
                    .table(Users::Table)
                    .col(Users::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Sessions::Table)
                    .col(pk_id_col(manager, Sessions::Id))
                    .col(uuid_col(Sessions::Uuid))
                    .col(fk_id_col(manager, Sessions::UserId))
                    .col(ColumnDef::new(Sessions::Token).string().not_null())
                    .col(
                        ColumnDef::new(Sessions::ExpiresAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(timestamp_col(Sessions::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sessions_user_id")
                            .from(Sessions::Table, Sessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_sessions_token")
                    .table(Sessions::Table)
                    .col(Sessions::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Teams::Table)
                    .col(pk_id_col(manager, Teams::Id))
                    .col(uuid_col(Teams::Uuid))
                    .col(ColumnDef::new(Teams::Name).string().not_null())
                    .col(timestamp_col(Teams::CreatedAt))
                    .col(timestamp_col(Teams::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_teams_uuid")
                    .table(Teams::Table)
                    .col(Teams::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(TeamMembers::Table)
                    .col(pk_id_col(manager, TeamMembers::Id))
                    .col(uuid_col(TeamMembers::Uuid))
                    .col(fk_id_col(manager, TeamMembers::TeamId))
                    .col(fk_id_col(manager, TeamMembers::UserId))
                    .col(
                        ColumnDef::new(TeamMembers::Kind)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("staff")),
                    )
                    .col(ColumnDef::new(TeamMembers::JobRoleIds).text())
                    .col(timestamp_col(TeamMembers::CreatedAt))
                    .col(timestamp_col(TeamMembers::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_members_team_id")
                            .from(TeamMembers::Table, TeamMembers::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_members_user_id")
                            .from(TeamMembers::Table, TeamMembers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_team_members_uuid")
                    .table(TeamMembers::Table)
                    .col(TeamMembers::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_team_members_team_user")
                    .table(TeamMembers::Table)
                    .col(TeamMembers::TeamId)
                    .col(TeamMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Projects::Table)
                    .col(pk_id_col(manager, Projects::Id))
                    .col(uuid_col(Projects::Uuid))
                    .col(ColumnDef::new(Projects::Name).string().not_null())
                    .col(ColumnDef::new(Projects::Description).text())
                    .col(ColumnDef::new(Projects::Deadline).date().not_null())
                    .col(timestamp_col(Projects::CreatedAt))
                    .col(timestamp_col(Projects::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_projects_uuid")
                    .table(Projects::Table)
                    .col(Projects::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(ProjectTeams::Table)
                    .col(pk_id_col(manager, ProjectTeams::Id))
                    .col(fk_id_col(manager, ProjectTeams::ProjectId))
                    .col(fk_id_col(manager, ProjectTeams::TeamId))
                    .col(timestamp_col(ProjectTeams::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_teams_project_id")
                            .from(ProjectTeams::Table, ProjectTeams::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_teams_team_id")
                            .from(ProjectTeams::Table, ProjectTeams::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_project_teams_project_team")
                    .table(ProjectTeams::Table)
                    .col(ProjectTeams::ProjectId)
                    .col(ProjectTeams::TeamId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Tasks::Table)
                    .col(pk_id_col(manager, Tasks::Id))
                    .col(uuid_col(Tasks::Uuid))
                    .col(fk_id_col(manager, Tasks::ProjectId))
                    .col(fk_id_nullable_col(manager, Tasks::TeamId))
                    .col(fk_id_nullable_col(manager, Tasks::AssigneeUserId))
                    .col(ColumnDef::new(Tasks::Title).string().not_null())
                    .col(ColumnDef::new(Tasks::Description).text())
                    .col(
                        ColumnDef::new(Tasks::Status)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("todo")),
                    )
                    .col(
                        ColumnDef::new(Tasks::Priority)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("medium")),
                    )
                    .col(ColumnDef::new(Tasks::DueDate).date())
                    .col(
                        ColumnDef::new(Tasks::Progress)
                            .integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(timestamp_col(Tasks::CreatedAt))
                    .col(timestamp_col(Tasks::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_project_id")
                            .from(Tasks::Table, Tasks::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_team_id")
                            .from(Tasks::Table, Tasks::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_assignee_user_id")
                            .from(Tasks::Table, Tasks::AssigneeUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tasks_uuid")
                    .table(Tasks::Table)
                    .col(Tasks::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tasks_project_id")
                    .table(Tasks::Table)
                    .col(Tasks::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(TaskTodos::Table)
                    .col(pk_id_col(manager, TaskTodos::Id))
                    .col(uuid_col(TaskTodos::Uuid))
                    .col(fk_id_col(manager, TaskTodos::TaskId))
                    .col(fk_id_nullable_col(manager, TaskTodos::AssigneeUserId))
                    .col(ColumnDef::new(TaskTodos::Title).string().not_null())
                    .col(
                        ColumnDef::new(TaskTodos::Status)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("todo")),
                    )
                    .col(ColumnDef::new(TaskTodos::Evidence).text())
                    .col(ColumnDef::new(TaskTodos::DueDate).date())
                    .col(timestamp_col(TaskTodos::CreatedAt))
                    .col(timestamp_col(TaskTodos::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_todos_task_id")
                            .from(TaskTodos::Table, TaskTodos::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_todos_assignee_user_id")
                            .from(TaskTodos::Table, TaskTodos::AssigneeUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_task_todos_uuid")
                    .table(TaskTodos::Table)
                    .col(TaskTodos::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_task_todos_task_id")
                    .table(TaskTodos::Table)
                    .col(TaskTodos::TaskId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TaskTodos::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectTeams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeamMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn fk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().to_owned()
}

fn fk_id_nullable_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.to_owned()
}

fn uuid_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Uuid,
    Name,
    Email,
    Role,
    Credential,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Sessions {
    Table,
    Id,
    Uuid,
    UserId,
    Token,
    ExpiresAt,
    CreatedAt,
}

#[derive(Iden)]
enum Teams {
    Table,
    Id,
    Uuid,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum TeamMembers {
    Table,
    Id,
    Uuid,
    TeamId,
    UserId,
    Kind,
    JobRoleIds,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    Uuid,
    Name,
    Description,
    Deadline,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ProjectTeams {
    Table,
    Id,
    ProjectId,
    TeamId,
    CreatedAt,
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    Uuid,
    ProjectId,
    TeamId,
    AssigneeUserId,
    Title,
    Description,
    Status,
    Priority,
    DueDate,
    Progress,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum TaskTodos {
    Table,
    Id,
    Uuid,
    TaskId,
    AssigneeUserId,
    Title,
    Status,
    Evidence,
    DueDate,
    CreatedAt,
    UpdatedAt,
}
