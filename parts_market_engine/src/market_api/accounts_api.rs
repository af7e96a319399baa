//! Unified API for read-only account, order and receipt queries.

use std::fmt::Debug;

use crate::{
    db_types::{EmailAddress, Order, Payment, UserAccount},
    market_api::order_objects::OrderResult,
    traits::{AccountApiError, AccountManagement},
};

pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Fetches the account record for the given email. If no account exists, `None` is returned.
    pub async fn account_by_email(&self, email: &EmailAddress) -> Result<Option<UserAccount>, AccountApiError> {
        self.db.fetch_account_by_email(email).await
    }

    pub async fn order_by_id(&self, order_id: i64) -> Result<Option<Order>, AccountApiError> {
        self.db.fetch_order_by_id(order_id).await
    }

    /// Fetches all orders belonging to the given email and wraps them in an [`OrderResult`], which includes the
    /// owner and the sum of the orders' values.
    pub async fn orders_for_email(&self, email: &EmailAddress) -> Result<OrderResult, AccountApiError> {
        let orders = self.db.fetch_orders_for_email(email).await?;
        let total_orders = orders.iter().map(|o| o.total_price).sum();
        Ok(OrderResult { email: email.clone(), total_orders, orders })
    }

    pub async fn payments_for_order(&self, order_id: i64) -> Result<Vec<Payment>, AccountApiError> {
        self.db.fetch_payments_for_order(order_id).await
    }
}
