use db::{
    DbErr,
    models::{session::Session, user::User},
    types::UserRole,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use sea_orm::ConnectionTrait;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Invalid or expired session")]
    InvalidSession,
    #[error("Invalid email or credential")]
    InvalidCredentials,
}

/// Caller identity resolved from a session token, attached to every request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: UserRole,
}

/// Operations gated by role. One closed set; every call site goes through
/// `authorize` instead of re-deriving the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Create,
    Edit,
    Move,
    Delete,
}

/// Central capability check for task mutations.
///
/// PM and ADMIN may do everything. STAFF may edit or move a task only when
/// they are its assignee. Creation and deletion are management actions.
pub fn authorize(action: TaskAction, caller: &Identity, assignee: Option<Uuid>) -> bool {
    match caller.role {
        UserRole::Admin | UserRole::Pm => true,
        UserRole::Staff => match action {
            TaskAction::Edit | TaskAction::Move => assignee == Some(caller.user_id),
            TaskAction::Create | TaskAction::Delete => false,
        },
    }
}

pub async fn resolve_identity<C: ConnectionTrait>(
    db: &C,
    token: &str,
) -> Result<Identity, AuthError> {
    let session = Session::find_valid_by_token(db, token)
        .await?
        .ok_or(AuthError::InvalidSession)?;
    let user = User::find_by_id(db, session.user_id)
        .await?
        .ok_or(AuthError::InvalidSession)?;
    Ok(Identity {
        user_id: user.id,
        role: user.role,
    })
}

/// Credential check + session issuance; returns the bearer token.
pub async fn login<C: ConnectionTrait>(
    db: &C,
    email: &str,
    credential: &str,
    ttl: chrono::Duration,
) -> Result<(User, String), AuthError> {
    let user = User::verify_credential(db, email, credential)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;
    let token = Uuid::new_v4().simple().to_string();
    Session::create(db, user.id, &token, ttl).await?;
    Ok((user, token))
}

pub async fn logout<C: ConnectionTrait>(db: &C, token: &str) -> Result<(), AuthError> {
    Session::delete_by_token(db, token).await?;
    Ok(())
}
