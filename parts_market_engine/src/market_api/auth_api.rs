use std::fmt::Debug;

use log::trace;
use serde_json::Value;

use crate::{
    db_types::{EmailAddress, Role, UpsertOutcome},
    traits::{AuthApiError, AuthManagement},
};

/// The `AuthApi` answers the two questions the server's authorization layer asks — "does this email exist, and is it
/// an admin?" — and performs the identity writes (login upserts and admin grants).
pub struct AuthApi<B> {
    db: B,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B> AuthApi<B>
where B: AuthManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Creates or overwrites the account for `email` with the client-supplied profile document.
    pub async fn upsert_account(&self, email: &EmailAddress, profile: &Value) -> Result<UpsertOutcome, AuthApiError> {
        self.db.upsert_account(email, profile).await
    }

    /// Whether the given email holds the admin role. A missing account record is simply "no"; privileged operations
    /// fail closed rather than erroring on unknown identities.
    pub async fn is_admin(&self, email: &EmailAddress) -> Result<bool, AuthApiError> {
        let role = self.db.fetch_role_for_email(email).await?;
        trace!("Role lookup for {email}: {role:?}");
        Ok(role == Some(Role::Admin))
    }

    /// Grants the admin role to `email`, creating the account if it does not exist yet. The caller is responsible
    /// for checking that the *requester* is an admin before invoking this.
    pub async fn promote_to_admin(&self, email: &EmailAddress) -> Result<UpsertOutcome, AuthApiError> {
        self.db.grant_admin(email).await
    }
}
