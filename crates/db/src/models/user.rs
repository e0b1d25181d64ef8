use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::{entities::user, types::UserRole};

/// Public view of a user record. The stored credential never leaves the
/// gateway; callers go through `verify_credential`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub credential: String,
}

impl User {
    fn from_model(model: user::Model) -> Self {
        Self {
            id: model.uuid,
            name: model.name,
            email: model.email,
            role: model.role,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    pub async fn count<C: ConnectionTrait>(db: &C) -> Result<i64, DbErr> {
        let count = user::Entity::find().count(db).await?;
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let records = user::Entity::find()
            .order_by_asc(user::Column::Name)
            .all(db)
            .await?;
        Ok(records.into_iter().map(Self::from_model).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<Self>, DbErr> {
        let record = user::Entity::find()
            .filter(user::Column::Uuid.eq(id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateUser,
        user_id: Uuid,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = user::ActiveModel {
            uuid: Set(user_id),
            name: Set(data.name.clone()),
            email: Set(data.email.clone()),
            role: Set(data.role),
            credential: Set(data.credential.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    /// Opaque credential comparison; returns the user on a match.
    pub async fn verify_credential<C: ConnectionTrait>(
        db: &C,
        email: &str,
        credential: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(db)
            .await?;
        Ok(record
            .filter(|model| model.credential == credential)
            .map(Self::from_model))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = user::Entity::delete_many()
            .filter(user::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn create_and_verify_credential() {
        let db = setup_db().await;
        let user = User::create(
            &db,
            &CreateUser {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                role: UserRole::Pm,
                credential: "s3cret".to_string(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let found = User::verify_credential(&db, "ada@example.com", "s3cret")
            .await
            .unwrap()
            .expect("credential should match");
        assert_eq!(found.id, user.id);
        assert_eq!(found.role, UserRole::Pm);

        let miss = User::verify_credential(&db, "ada@example.com", "wrong")
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let db = setup_db().await;
        let data = CreateUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            role: UserRole::Staff,
            credential: "x".to_string(),
        };
        User::create(&db, &data, Uuid::new_v4()).await.unwrap();
        assert!(User::create(&db, &data, Uuid::new_v4()).await.is_err());
    }
}
