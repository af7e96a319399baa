use thiserror::Error;

use crate::db_types::{EmailAddress, Order, Payment, UserAccount};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Stored record is corrupt: {0}")]
    CorruptRecord(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// Read-only queries over identity records, orders and payment receipts.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Fetches the account record for the given email. If no account exists, `None` is returned.
    async fn fetch_account_by_email(&self, email: &EmailAddress) -> Result<Option<UserAccount>, AccountApiError>;

    /// Fetches all orders belonging to the given email, oldest first. An unknown email yields an empty list.
    async fn fetch_orders_for_email(&self, email: &EmailAddress) -> Result<Vec<Order>, AccountApiError>;

    /// Fetches a single order by its identifier.
    async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, AccountApiError>;

    /// Fetches the payment receipts recorded against the given order.
    async fn fetch_payments_for_order(&self, order_id: i64) -> Result<Vec<Payment>, AccountApiError>;
}
