use serde_json::Value;
use thiserror::Error;

use crate::db_types::{EmailAddress, Role, UpsertOutcome};

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User account not found")]
    AccountNotFound,
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}

/// The `AuthManagement` trait defines behaviour for managing identity records.
///
/// Authentication itself (signing and verifying bearer tokens) happens at the server level and is stateless; the
/// store only ever sees the verified email. These methods exist so that the server can mint accounts at login and
/// answer role questions when a privileged operation is requested.
#[allow(async_fn_in_trait)]
pub trait AuthManagement {
    /// Creates or overwrites the account record for `email` with the supplied profile document.
    ///
    /// If the document carries a `role` field it replaces the stored role (unknown strings demote to plain user);
    /// otherwise an existing role is left untouched and new accounts start as plain users.
    async fn upsert_account(&self, email: &EmailAddress, profile: &Value) -> Result<UpsertOutcome, AuthApiError>;

    /// Fetches the role for the given email. Returns `None` when no account record exists; callers must treat that
    /// as "not an admin" rather than as a failure.
    async fn fetch_role_for_email(&self, email: &EmailAddress) -> Result<Option<Role>, AuthApiError>;

    /// Sets the role for `email` to admin, creating a bare account record if none exists. Idempotent.
    async fn grant_admin(&self, email: &EmailAddress) -> Result<UpsertOutcome, AuthApiError>;
}
