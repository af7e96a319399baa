use thiserror::Error;

use crate::db_types::{NewOrder, NewPayment, Order};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order #{0} does not exist")]
    OrderNotFound(i64),
    #[error("Order #{0} has already been settled")]
    OrderAlreadySettled(i64),
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}

/// The order lifecycle writes. An order is born unpaid and makes exactly one transition, to paid, when a completed
/// payment is reconciled against it. Backends must make that transition atomic with the receipt insert.
#[allow(async_fn_in_trait)]
pub trait OrderFlowDatabase {
    /// Inserts a brand-new unpaid order and returns the stored record. The payload is taken at face value; no
    /// pricing or ownership checks are applied here.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError>;

    /// Settles an order in a single transaction: flips `paid` from false to true, records the transaction id, and
    /// appends the payment receipt. Either every write lands or none do.
    ///
    /// Fails with [`OrderFlowError::OrderAlreadySettled`] if the order is already paid (settlement is one-way), and
    /// [`OrderFlowError::OrderNotFound`] if the order does not exist.
    async fn settle_order(&self, order_id: i64, payment: NewPayment) -> Result<Order, OrderFlowError>;

    /// Deletes an order by id, returning whether a row was removed. No ownership check is made; callers gate access.
    async fn delete_order(&self, order_id: i64) -> Result<bool, OrderFlowError>;
}
