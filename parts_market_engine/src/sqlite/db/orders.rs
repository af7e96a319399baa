//! SQLite operations for the orders table.

use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{EmailAddress, NewOrder, Order},
    traits::OrderFlowError,
};

/// Inserts a new unpaid order using the given connection. This is not atomic on its own. You can embed this call
/// inside a transaction if you need atomicity with other writes, and pass `&mut tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderFlowError> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                email,
                part,
                quantity,
                total_price,
                delivery_address,
                phone
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order.email)
    .bind(order.part)
    .bind(order.quantity)
    .bind(order.total_price)
    .bind(order.delivery_address)
    .bind(order.phone)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order [{}] inserted for {}", order.id, order.email);
    Ok(order)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

/// Returns all orders belonging to `email`, oldest first.
pub async fn fetch_orders_for_email(
    email: &EmailAddress,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE email = $1 ORDER BY created_at ASC")
        .bind(email.as_str())
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Flips the order's paid flag from false to true and records the transaction id, in one statement. The
/// `paid = 0` guard makes the transition one-way: a settled order is never matched again, so the returned row
/// count is 0 for both missing and already-settled orders.
pub async fn mark_order_paid(id: i64, txid: &str, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"UPDATE orders SET paid = 1, transaction_id = $1, updated_at = CURRENT_TIMESTAMP
           WHERE id = $2 AND paid = 0"#,
    )
    .bind(txid)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_order(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
