//! SQLite operations for the append-only payments table.

use chrono::{DateTime, Utc};
use log::debug;
use serde_json::Value;
use sqlx::{FromRow, SqliteConnection};

use crate::{
    db_types::{EmailAddress, NewPayment, Payment},
    traits::AccountApiError,
};

#[derive(Debug, Clone, FromRow)]
struct PaymentRow {
    id: i64,
    order_id: i64,
    email: String,
    txid: String,
    amount: i64,
    detail: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = AccountApiError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let detail = serde_json::from_str::<Value>(&row.detail)
            .map_err(|e| AccountApiError::CorruptRecord(format!("payment detail for {}: {e}", row.txid)))?;
        Ok(Payment {
            id: row.id,
            order_id: row.order_id,
            email: EmailAddress::new(row.email),
            txid: row.txid,
            amount: row.amount.into(),
            detail,
            created_at: row.created_at,
        })
    }
}

/// Appends a payment receipt and returns its id. Receipts are never updated or deleted.
pub async fn insert_payment(
    order_id: i64,
    payment: &NewPayment,
    conn: &mut SqliteConnection,
) -> Result<i64, sqlx::Error> {
    let detail = if payment.detail.is_null() { "{}".to_string() } else { payment.detail.to_string() };
    let id: i64 = sqlx::query_scalar(
        r#"INSERT INTO payments (order_id, email, txid, amount, detail) VALUES ($1, $2, $3, $4, $5)
           RETURNING id"#,
    )
    .bind(order_id)
    .bind(payment.email.as_str())
    .bind(&payment.txid)
    .bind(payment.amount)
    .bind(detail)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Payment receipt [{}] recorded for order #{order_id}", payment.txid);
    Ok(id)
}

pub async fn fetch_payments_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Payment>, AccountApiError> {
    let rows = sqlx::query_as::<_, PaymentRow>(
        "SELECT * FROM payments WHERE order_id = $1 ORDER BY created_at ASC",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    rows.into_iter().map(Payment::try_from).collect()
}
