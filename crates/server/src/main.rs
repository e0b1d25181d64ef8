use db::{
    DbErr, DbService,
    models::{
        session::Session,
        user::{CreateUser, User},
    },
    types::UserRole,
};
use server::{AppState, http};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, prelude::*};
use uuid::Uuid;

const SESSION_PRUNE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60 * 60);
const DEFAULT_DATABASE_URL: &str = "sqlite://staffboard.sqlite?mode=rwc";
const BOOTSTRAP_ADMIN_EMAIL_ENV: &str = "STAFFBOARD_ADMIN_EMAIL";
const BOOTSTRAP_ADMIN_CREDENTIAL_ENV: &str = "STAFFBOARD_ADMIN_CREDENTIAL";

#[derive(Debug, Error)]
pub enum StaffboardError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

#[tokio::main]
async fn main() -> Result<(), StaffboardError> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_string = format!(
        "warn,server={level},services={level},db={level},board_store={level}",
        level = log_level
    );
    let env_filter = EnvFilter::try_new(filter_string).expect("Failed to create tracing filter");
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let db = DbService::connect(&database_url).await?;

    bootstrap_admin_if_empty(&db).await?;

    let prune_pool = db.pool.clone();
    tokio::spawn(async move {
        loop {
            match Session::prune_expired(&prune_pool).await {
                Ok(removed) if removed > 0 => {
                    tracing::info!(removed, "Pruned expired sessions");
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(error = %err, "Failed to prune expired sessions"),
            }
            tokio::time::sleep(SESSION_PRUNE_INTERVAL).await;
        }
    });

    let app_router = http::router(AppState::new(db));

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.trim().parse::<u16>().ok())
        .unwrap_or(3000);
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    let actual_port = listener.local_addr()?.port();

    tracing::info!("Server running on http://{host}:{actual_port}");

    axum::serve(listener, app_router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// First boot on an empty database seeds one admin account so the instance
/// can be signed into at all. Credentials come from the environment, with
/// throwaway defaults for local development.
async fn bootstrap_admin_if_empty(db: &DbService) -> Result<(), DbErr> {
    if User::count(&db.pool).await? > 0 {
        return Ok(());
    }

    let email = std::env::var(BOOTSTRAP_ADMIN_EMAIL_ENV)
        .unwrap_or_else(|_| "admin@localhost".to_string());
    let credential =
        std::env::var(BOOTSTRAP_ADMIN_CREDENTIAL_ENV).unwrap_or_else(|_| "admin".to_string());

    let user = User::create(
        &db.pool,
        &CreateUser {
            name: "Administrator".to_string(),
            email: email.clone(),
            role: UserRole::Admin,
            credential,
        },
        Uuid::new_v4(),
    )
    .await?;
    tracing::info!(user_id = %user.id, email, "Bootstrapped admin account on empty database");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sig) => Some(sig),
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                None
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = async {
                if let Some(sigterm) = sigterm.as_mut() {
                    sigterm.recv().await;
                } else {
                    std::future::pending::<()>().await;
                }
            } => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received, stopping server");
}
