use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::{entities::session, models::ids};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        model: session::Model,
    ) -> Result<Self, DbErr> {
        let user_id = ids::user_uuid_by_id(db, model.user_id)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;
        Ok(Self {
            id: model.uuid,
            user_id,
            token: model.token,
            expires_at: model.expires_at.into(),
            created_at: model.created_at.into(),
        })
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        token: &str,
        ttl: Duration,
    ) -> Result<Self, DbErr> {
        let user_row_id = ids::user_id_by_uuid(db, user_id)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;
        let now = Utc::now();
        let active = session::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            user_id: Set(user_row_id),
            token: Set(token.to_string()),
            expires_at: Set((now + ttl).into()),
            created_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Self::from_model(db, model).await
    }

    /// Resolve an unexpired session by its token.
    pub async fn find_valid_by_token<C: ConnectionTrait>(
        db: &C,
        token: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = session::Entity::find()
            .filter(session::Column::Token.eq(token))
            .one(db)
            .await?;
        match record {
            Some(model) if DateTime::<Utc>::from(model.expires_at) > Utc::now() => {
                Ok(Some(Self::from_model(db, model).await?))
            }
            _ => Ok(None),
        }
    }

    pub async fn delete_by_token<C: ConnectionTrait>(
        db: &C,
        token: &str,
    ) -> Result<u64, DbErr> {
        let result = session::Entity::delete_many()
            .filter(session::Column::Token.eq(token))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn prune_expired<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
        let result = session::Entity::delete_many()
            .filter(session::Column::ExpiresAt.lte(Utc::now()))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
