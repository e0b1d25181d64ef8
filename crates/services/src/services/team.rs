use db::{
    TransactionTrait,
    models::team::{CreateTeam, CreateTeamMember, Team, TeamError, UpdateTeamMember},
    types::{MemberKind, UserRole},
};
use sea_orm::{ConnectionTrait, TransactionSession};
use uuid::Uuid;

use super::{
    auth::Identity,
    workflow::{Result, WorkflowError},
};

fn require_manager(caller: &Identity) -> Result<()> {
    match caller.role {
        UserRole::Admin | UserRole::Pm => Ok(()),
        UserRole::Staff => Err(WorkflowError::Forbidden(
            "Only PM or admin users may manage teams",
        )),
    }
}

fn map_team_err(err: TeamError) -> WorkflowError {
    match err {
        TeamError::Database(err) => WorkflowError::Database(err),
        TeamError::TeamNotFound => WorkflowError::NotFound("Team"),
        TeamError::MemberNotFound => WorkflowError::NotFound("Team member"),
        TeamError::UserNotFound => WorkflowError::NotFound("User"),
    }
}

fn pm_count(team: &Team) -> usize {
    team.members
        .iter()
        .filter(|m| m.kind == MemberKind::Pm)
        .count()
}

pub struct TeamService;

impl TeamService {
    /// New teams must name exactly one PM member. Later member edits may
    /// drift from that shape; see `warn_on_pm_drift`.
    pub async fn create_team<C: ConnectionTrait + TransactionTrait>(
        db: &C,
        caller: &Identity,
        data: CreateTeam,
    ) -> Result<Team> {
        require_manager(caller)?;
        if data.name.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "Team name must not be empty".to_string(),
            ));
        }
        let pms = data
            .members
            .iter()
            .filter(|m| m.kind == MemberKind::Pm)
            .count();
        if !data.members.is_empty() && pms != 1 {
            return Err(WorkflowError::Validation(format!(
                "A team must have exactly one PM member, got {pms}"
            )));
        }

        let txn = db.begin().await?;
        let team = Team::create(&txn, &data, Uuid::new_v4())
            .await
            .map_err(map_team_err)?;
        txn.commit().await?;

        tracing::info!(team_id = %team.id, members = team.members.len(), "Created team");
        Ok(team)
    }

    pub async fn rename_team<C: ConnectionTrait>(
        db: &C,
        caller: &Identity,
        team_id: Uuid,
        name: String,
    ) -> Result<Team> {
        require_manager(caller)?;
        if name.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "Team name must not be empty".to_string(),
            ));
        }
        Team::update_name(db, team_id, name)
            .await
            .map_err(map_team_err)
    }

    pub async fn add_member<C: ConnectionTrait>(
        db: &C,
        caller: &Identity,
        team_id: Uuid,
        member: CreateTeamMember,
    ) -> Result<Team> {
        require_manager(caller)?;
        Team::add_member(db, team_id, &member)
            .await
            .map_err(map_team_err)?;
        let team = Team::find_by_id(db, team_id)
            .await?
            .ok_or(WorkflowError::NotFound("Team"))?;
        Self::warn_on_pm_drift(&team);
        Ok(team)
    }

    pub async fn update_member<C: ConnectionTrait>(
        db: &C,
        caller: &Identity,
        member_id: Uuid,
        payload: UpdateTeamMember,
    ) -> Result<Team> {
        require_manager(caller)?;
        Team::update_member(db, member_id, &payload)
            .await
            .map_err(map_team_err)?;
        let team_id = Team::team_id_of_member(db, member_id)
            .await?
            .ok_or(WorkflowError::NotFound("Team member"))?;
        let team = Team::find_by_id(db, team_id)
            .await?
            .ok_or(WorkflowError::NotFound("Team"))?;
        Self::warn_on_pm_drift(&team);
        Ok(team)
    }

    pub async fn remove_member<C: ConnectionTrait>(
        db: &C,
        caller: &Identity,
        member_id: Uuid,
    ) -> Result<Team> {
        require_manager(caller)?;
        let team_id = Team::team_id_of_member(db, member_id)
            .await?
            .ok_or(WorkflowError::NotFound("Team member"))?;
        Team::remove_member(db, member_id).await?;
        let team = Team::find_by_id(db, team_id)
            .await?
            .ok_or(WorkflowError::NotFound("Team"))?;
        Self::warn_on_pm_drift(&team);
        Ok(team)
    }

    pub async fn delete_team<C: ConnectionTrait>(
        db: &C,
        caller: &Identity,
        team_id: Uuid,
    ) -> Result<()> {
        require_manager(caller)?;
        let deleted = Team::delete(db, team_id).await?;
        if deleted == 0 {
            return Err(WorkflowError::NotFound("Team"));
        }
        Ok(())
    }

    pub async fn list_teams<C: ConnectionTrait>(db: &C) -> Result<Vec<Team>> {
        Team::find_all(db).await.map_err(map_team_err)
    }

    pub async fn get_team<C: ConnectionTrait>(db: &C, team_id: Uuid) -> Result<Team> {
        Team::find_by_id(db, team_id)
            .await?
            .ok_or(WorkflowError::NotFound("Team"))
    }

    /// The one-PM shape is only enforced at creation. Edits that leave a
    /// team with zero or several PMs are accepted but logged.
    fn warn_on_pm_drift(team: &Team) {
        let pms = pm_count(team);
        if !team.members.is_empty() && pms != 1 {
            tracing::warn!(team_id = %team.id, pm_count = pms, "Team no longer has exactly one PM");
        }
    }
}
