//! `SqliteDatabase` is a concrete implementation of a parts marketplace storage backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`](crate::traits)
//! module.
use std::fmt::Debug;

use log::*;
use serde_json::Value;
use sqlx::SqlitePool;

use super::db::{db_url, new_pool, orders, payments, users};
use crate::{
    db_types::{EmailAddress, NewOrder, NewPayment, Order, Payment, Role, UpsertOutcome, UserAccount},
    traits::{
        AccountApiError,
        AccountManagement,
        AuthApiError,
        AuthManagement,
        OrderFlowDatabase,
        OrderFlowError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database instance, using the `PMS_DATABASE_URL` environment variable or the default.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        debug!("🗃️ Database migrations complete for {url}");
        Ok(Self { url: url.to_string(), pool })
    }

    /// An in-memory instance for tests. A single connection keeps every query on the same ephemeral database.
    pub async fn new_in_memory() -> Result<Self, sqlx::Error> {
        Self::new_with_url("sqlite::memory:", 1).await
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl AuthManagement for SqliteDatabase {
    async fn upsert_account(&self, email: &EmailAddress, profile: &Value) -> Result<UpsertOutcome, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        users::upsert_account(email, profile, &mut conn).await
    }

    async fn fetch_role_for_email(&self, email: &EmailAddress) -> Result<Option<Role>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        users::role_for_email(email, &mut conn).await
    }

    async fn grant_admin(&self, email: &EmailAddress) -> Result<UpsertOutcome, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        users::grant_admin(email, &mut conn).await
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_account_by_email(&self, email: &EmailAddress) -> Result<Option<UserAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_account_by_email(email, &mut conn).await
    }

    async fn fetch_orders_for_email(&self, email: &EmailAddress) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_email(email, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_payments_for_order(&self, order_id: i64) -> Result<Vec<Payment>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payments_for_order(order_id, &mut conn).await
    }
}

impl OrderFlowDatabase for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_order(order, &mut conn).await
    }

    /// Settles an order in a single atomic transaction:
    /// * the paid flag is flipped with a `paid = 0` guard, so a settled order can never be settled twice, and
    /// * the payment receipt is appended.
    ///
    /// If the guard does not match, the transaction is rolled back and no receipt is written. The order is either
    /// missing or already paid; the two cases are distinguished for the caller.
    async fn settle_order(&self, order_id: i64, payment: NewPayment) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let rows = orders::mark_order_paid(order_id, &payment.txid, &mut tx).await?;
        if rows == 0 {
            let existing = orders::fetch_order_by_id(order_id, &mut tx).await?;
            return Err(match existing {
                Some(_) => OrderFlowError::OrderAlreadySettled(order_id),
                None => OrderFlowError::OrderNotFound(order_id),
            });
        }
        payments::insert_payment(order_id, &payment, &mut tx).await?;
        let order = orders::fetch_order_by_id(order_id, &mut tx)
            .await?
            .ok_or(OrderFlowError::OrderNotFound(order_id))?;
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} settled with transaction [{}]", payment.txid);
        Ok(order)
    }

    async fn delete_order(&self, order_id: i64) -> Result<bool, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let deleted = orders::delete_order(order_id, &mut conn).await?;
        if deleted {
            info!("🗃️ Order #{order_id} deleted");
        }
        Ok(deleted)
    }
}
