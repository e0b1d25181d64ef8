use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;

pub mod entities;
pub mod models;
pub mod types;

pub use sea_orm::{DbErr, TransactionTrait};

pub type DbPool = sea_orm::DatabaseConnection;

#[derive(Clone)]
pub struct DbService {
    pub pool: DbPool,
}

impl DbService {
    /// Connect and bring the schema up to date. `database_url` is typically
    /// `sqlite://<path>?mode=rwc` or `sqlite::memory:`.
    pub async fn connect(database_url: &str) -> Result<DbService, DbErr> {
        let mut options = ConnectOptions::new(database_url.to_string());
        options.sqlx_logging(false);
        let pool = Database::connect(options).await?;
        db_migration::Migrator::up(&pool, None).await?;
        Ok(DbService { pool })
    }
}
