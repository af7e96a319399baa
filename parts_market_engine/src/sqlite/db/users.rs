//! SQLite operations for identity records.
//!
//! Clients should generally not call these functions directly, and prefer the [`AuthManagement`] and
//! [`AccountManagement`] trait methods implemented on [`SqliteDatabase`](crate::SqliteDatabase) instead.

use chrono::{DateTime, Utc};
use log::debug;
use serde_json::Value;
use sqlx::{FromRow, SqliteConnection};

use crate::{
    db_types::{EmailAddress, Role, UpsertOutcome, UserAccount},
    traits::{AccountApiError, AuthApiError},
};

/// The raw shape of a `users` row. The role and profile columns are plain text and get converted when the row is
/// lifted into a [`UserAccount`].
#[derive(Debug, Clone, FromRow)]
struct UserRow {
    id: i64,
    email: String,
    role: String,
    profile: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = AccountApiError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let profile = serde_json::from_str::<Value>(&row.profile)
            .map_err(|e| AccountApiError::CorruptRecord(format!("profile for {}: {e}", row.email)))?;
        Ok(UserAccount {
            id: row.id,
            email: EmailAddress::new(row.email),
            role: Role::from(row.role),
            profile,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub async fn fetch_account_by_email(
    email: &EmailAddress,
    conn: &mut SqliteConnection,
) -> Result<Option<UserAccount>, AccountApiError> {
    let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(conn)
        .await?;
    row.map(UserAccount::try_from).transpose()
}

/// Fetches the role column for the given email. `None` means no account record exists at all.
pub async fn role_for_email(
    email: &EmailAddress,
    conn: &mut SqliteConnection,
) -> Result<Option<Role>, AuthApiError> {
    let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(role.map(Role::from))
}

/// Creates or overwrites the account for `email` with the given profile document.
///
/// The document is stored verbatim. A `role` field inside it replaces the stored role; otherwise the existing role
/// is preserved (new accounts start as plain users). Concurrent upserts resolve last-write-wins.
pub async fn upsert_account(
    email: &EmailAddress,
    profile: &Value,
    conn: &mut SqliteConnection,
) -> Result<UpsertOutcome, AuthApiError> {
    let requested_role =
        profile.get("role").and_then(Value::as_str).map(|s| Role::from(s.to_string()));
    let existing_role = role_for_email(email, &mut *conn).await?;
    let profile_text = profile.to_string();
    let outcome = match existing_role {
        Some(current) => {
            let role = requested_role.unwrap_or(current);
            sqlx::query("UPDATE users SET role = $1, profile = $2, updated_at = CURRENT_TIMESTAMP WHERE email = $3")
                .bind(role.to_string())
                .bind(&profile_text)
                .bind(email.as_str())
                .execute(conn)
                .await?;
            UpsertOutcome::Updated
        },
        None => {
            let role = requested_role.unwrap_or_default();
            sqlx::query("INSERT INTO users (email, role, profile) VALUES ($1, $2, $3)")
                .bind(email.as_str())
                .bind(role.to_string())
                .bind(&profile_text)
                .execute(conn)
                .await?;
            UpsertOutcome::Created
        },
    };
    debug!("🗃️ Account for {email} {outcome}");
    Ok(outcome)
}

/// Sets the role for `email` to admin, creating a bare record if none exists. The returned outcome says which of
/// the two happened.
pub async fn grant_admin(
    email: &EmailAddress,
    conn: &mut SqliteConnection,
) -> Result<UpsertOutcome, AuthApiError> {
    let existed = role_for_email(email, &mut *conn).await?.is_some();
    sqlx::query(
        r#"INSERT INTO users (email, role) VALUES ($1, 'admin')
           ON CONFLICT(email) DO UPDATE SET role = 'admin', updated_at = CURRENT_TIMESTAMP"#,
    )
    .bind(email.as_str())
    .execute(conn)
    .await?;
    debug!("🗃️ {email} now has the admin role");
    Ok(if existed { UpsertOutcome::Updated } else { UpsertOutcome::Created })
}
