//! The role authorizer decides whether a gate-verified identity may perform a specific operation.
//!
//! Two capability shapes exist, and every protected route uses exactly one of them through the same predicate
//! rather than re-implementing the check inline:
//!
//! * [`AccessPolicy::SelfOnly`] — the caller may only act on its own records. This is a pure comparison between
//!   the token email and the path email; no store lookup happens.
//! * [`AccessPolicy::AdminOnly`] — the caller's own account record must hold the admin role. The lookup goes
//!   through the credential store on every call, and a missing record counts as "not an admin".

use log::debug;
use parts_market_engine::{db_types::EmailAddress, traits::AuthManagement, AuthApi};

use crate::{auth::JwtClaims, errors::ServerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy<'a> {
    /// The path email must equal the token email, byte for byte.
    SelfOnly { requested: &'a EmailAddress },
    /// The requester must be an administrator.
    AdminOnly,
}

impl AccessPolicy<'_> {
    /// Grants or denies the operation for the given claims. Denials are always explicit
    /// [`ServerError::InsufficientPermissions`] rejections, never silent successes.
    pub async fn enforce<B: AuthManagement>(
        &self,
        claims: &JwtClaims,
        api: &AuthApi<B>,
    ) -> Result<(), ServerError> {
        match self {
            AccessPolicy::SelfOnly { requested } => {
                if &claims.email == *requested {
                    Ok(())
                } else {
                    debug!("🔐️ {} may not act on records belonging to {requested}", claims.email);
                    Err(ServerError::InsufficientPermissions(format!(
                        "{} may not act on records belonging to another user",
                        claims.email
                    )))
                }
            },
            AccessPolicy::AdminOnly => {
                if api.is_admin(&claims.email).await? {
                    Ok(())
                } else {
                    debug!("🔐️ {} attempted an admin-only operation", claims.email);
                    Err(ServerError::InsufficientPermissions(format!(
                        "{} is not an administrator",
                        claims.email
                    )))
                }
            },
        }
    }
}
