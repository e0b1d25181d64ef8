use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::{
    entities::{project_team, team, team_member},
    models::ids,
    types::MemberKind,
};

#[derive(Debug, Error)]
pub enum TeamError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Team not found")]
    TeamNotFound,
    #[error("Team member not found")]
    MemberNotFound,
    #[error("User not found")]
    UserNotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<TeamMember>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct TeamMember {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: MemberKind,
    pub job_role_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateTeam {
    pub name: String,
    pub members: Vec<CreateTeamMember>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateTeamMember {
    pub user_id: Uuid,
    pub kind: MemberKind,
    #[serde(default)]
    pub job_role_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct UpdateTeamMember {
    pub kind: Option<MemberKind>,
    pub job_role_ids: Option<Vec<Uuid>>,
}

fn encode_job_roles(job_role_ids: &[Uuid]) -> Result<Option<String>, DbErr> {
    if job_role_ids.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(job_role_ids)
        .map(Some)
        .map_err(|err| DbErr::Custom(err.to_string()))
}

fn decode_job_roles(raw: Option<&str>) -> Result<Vec<Uuid>, DbErr> {
    match raw {
        Some(raw) => serde_json::from_str(raw).map_err(|err| DbErr::Custom(err.to_string())),
        None => Ok(Vec::new()),
    }
}

impl Team {
    async fn from_model<C: ConnectionTrait>(db: &C, model: team::Model) -> Result<Self, DbErr> {
        let members = Self::members_by_row_id(db, model.id).await?;
        Ok(Self {
            id: model.uuid,
            name: model.name,
            members,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    async fn members_by_row_id<C: ConnectionTrait>(
        db: &C,
        team_row_id: i64,
    ) -> Result<Vec<TeamMember>, DbErr> {
        let models = team_member::Entity::find()
            .filter(team_member::Column::TeamId.eq(team_row_id))
            .order_by_asc(team_member::Column::Id)
            .all(db)
            .await?;

        let mut members = Vec::with_capacity(models.len());
        for model in models {
            let user_id = ids::user_uuid_by_id(db, model.user_id)
                .await?
                .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;
            members.push(TeamMember {
                id: model.uuid,
                user_id,
                kind: model.kind,
                job_role_ids: decode_job_roles(model.job_role_ids.as_deref())?,
            });
        }
        Ok(members)
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, TeamError> {
        let records = team::Entity::find()
            .order_by_asc(team::Column::Name)
            .all(db)
            .await?;
        let mut teams = Vec::with_capacity(records.len());
        for record in records {
            teams.push(Self::from_model(db, record).await?);
        }
        Ok(teams)
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<Self>, DbErr> {
        let record = team::Entity::find()
            .filter(team::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    /// Teams assigned to a project, in assignment order. The first entry is
    /// the default team for new tasks.
    pub async fn find_by_project_id<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        let project_row_id = match ids::project_id_by_uuid(db, project_id).await? {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };

        let team_row_ids: Vec<i64> = project_team::Entity::find()
            .select_only()
            .column(project_team::Column::TeamId)
            .filter(project_team::Column::ProjectId.eq(project_row_id))
            .order_by_asc(project_team::Column::Id)
            .into_tuple()
            .all(db)
            .await?;

        let mut teams = Vec::with_capacity(team_row_ids.len());
        for team_row_id in team_row_ids {
            if let Some(model) = team::Entity::find_by_id(team_row_id).one(db).await? {
                teams.push(Self::from_model(db, model).await?);
            }
        }
        Ok(teams)
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateTeam,
        team_id: Uuid,
    ) -> Result<Self, TeamError> {
        let now = Utc::now();
        let active = team::ActiveModel {
            uuid: Set(team_id),
            name: Set(data.name.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;

        for member in &data.members {
            Self::insert_member(db, model.id, member).await?;
        }

        Ok(Self::from_model(db, model).await?)
    }

    async fn insert_member<C: ConnectionTrait>(
        db: &C,
        team_row_id: i64,
        member: &CreateTeamMember,
    ) -> Result<(), TeamError> {
        let user_row_id = ids::user_id_by_uuid(db, member.user_id)
            .await?
            .ok_or(TeamError::UserNotFound)?;
        let now = Utc::now();
        let active = team_member::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            team_id: Set(team_row_id),
            user_id: Set(user_row_id),
            kind: Set(member.kind),
            job_role_ids: Set(encode_job_roles(&member.job_role_ids)?),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        active.insert(db).await?;
        Ok(())
    }

    pub async fn update_name<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        name: String,
    ) -> Result<Self, TeamError> {
        let record = team::Entity::find()
            .filter(team::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(TeamError::TeamNotFound)?;
        let mut active: team::ActiveModel = record.into();
        active.name = Set(name);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(db).await?;
        Ok(Self::from_model(db, updated).await?)
    }

    pub async fn add_member<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        member: &CreateTeamMember,
    ) -> Result<Self, TeamError> {
        let record = team::Entity::find()
            .filter(team::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(TeamError::TeamNotFound)?;
        Self::insert_member(db, record.id, member).await?;
        Ok(Self::from_model(db, record).await?)
    }

    pub async fn update_member<C: ConnectionTrait>(
        db: &C,
        member_id: Uuid,
        payload: &UpdateTeamMember,
    ) -> Result<(), TeamError> {
        let record = team_member::Entity::find()
            .filter(team_member::Column::Uuid.eq(member_id))
            .one(db)
            .await?
            .ok_or(TeamError::MemberNotFound)?;
        let mut active: team_member::ActiveModel = record.into();
        if let Some(kind) = payload.kind {
            active.kind = Set(kind);
        }
        if let Some(job_role_ids) = &payload.job_role_ids {
            active.job_role_ids = Set(encode_job_roles(job_role_ids)?);
        }
        active.updated_at = Set(Utc::now().into());
        active.update(db).await?;
        Ok(())
    }

    pub async fn remove_member<C: ConnectionTrait>(
        db: &C,
        member_id: Uuid,
    ) -> Result<u64, DbErr> {
        let result = team_member::Entity::delete_many()
            .filter(team_member::Column::Uuid.eq(member_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Team uuid for a member row, used to re-inspect a team after edits.
    pub async fn team_id_of_member<C: ConnectionTrait>(
        db: &C,
        member_id: Uuid,
    ) -> Result<Option<Uuid>, DbErr> {
        let team_row_id: Option<i64> = team_member::Entity::find()
            .select_only()
            .column(team_member::Column::TeamId)
            .filter(team_member::Column::Uuid.eq(member_id))
            .into_tuple()
            .one(db)
            .await?;
        match team_row_id {
            Some(id) => ids::team_uuid_by_id(db, id).await,
            None => Ok(None),
        }
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = team::Entity::delete_many()
            .filter(team::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use crate::{
        models::user::{CreateUser, User},
        types::UserRole,
    };

    use super::*;

    async fn setup() -> (sea_orm::DatabaseConnection, User, User) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        let pm = User::create(
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
        let staff = User::create(
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
        (db, pm, staff)
    }

    #[tokio::test]
    async fn create_team_with_members_and_edit() {
        let (db, pm, staff) = setup().await;
        let role_id = Uuid::new_v4();

        let team = Team::create(
            &db,
            &CreateTeam {
                name: "Platform".to_string(),
                members: vec![
                    CreateTeamMember {
                        user_id: pm.id,
                        kind: MemberKind::Pm,
                        job_role_ids: Vec::new(),
                    },
                    CreateTeamMember {
                        user_id: staff.id,
                        kind: MemberKind::Staff,
                        job_role_ids: vec![role_id],
                    },
                ],
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        assert_eq!(team.members.len(), 2);
        assert_eq!(team.members[0].kind, MemberKind::Pm);
        assert_eq!(team.members[1].job_role_ids, vec![role_id]);

        let member_id = team.members[1].id;
        Team::update_member(
            &db,
            member_id,
            &UpdateTeamMember {
                kind: Some(MemberKind::Pm),
                job_role_ids: Some(Vec::new()),
            },
        )
        .await
        .unwrap();

        let reloaded = Team::find_by_id(&db, team.id).await.unwrap().unwrap();
        let member = reloaded
            .members
            .iter()
            .find(|m| m.id == member_id)
            .unwrap();
        assert_eq!(member.kind, MemberKind::Pm);
        assert!(member.job_role_ids.is_empty());

        Team::remove_member(&db, member_id).await.unwrap();
        let reloaded = Team::find_by_id(&db, team.id).await.unwrap().unwrap();
        assert_eq!(reloaded.members.len(), 1);
    }
}
