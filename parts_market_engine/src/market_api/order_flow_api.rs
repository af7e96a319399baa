use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewOrder, NewPayment, Order},
    traits::{OrderFlowDatabase, OrderFlowError},
};

/// `OrderFlowApi` is the primary API for handling order and payment flows: checkout submissions, payment
/// settlement, and order deletion.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B>
where B: OrderFlowDatabase
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Submit a new order. The order starts its life unpaid; the payload is stored as submitted.
    pub async fn submit_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        let order = self.db.insert_order(order).await?;
        debug!("🔄️📦️ Order #{} submitted by {} for {}", order.id, order.email, order.total_price);
        Ok(order)
    }

    /// Reconcile a completed payment against an order.
    ///
    /// In one atomic step the order is marked paid with the reported transaction id, and the payment receipt is
    /// appended. The paid transition is one-way; settling an already-settled order fails without touching either
    /// record.
    pub async fn settle_order(&self, order_id: i64, payment: NewPayment) -> Result<Order, OrderFlowError> {
        let txid = payment.txid.clone();
        let order = self.db.settle_order(order_id, payment).await?;
        debug!("🔄️💰️ Order #{order_id} settled. Transaction [{txid}] recorded for {}", order.email);
        Ok(order)
    }

    /// Delete an order by id. Returns `true` if a row was removed.
    pub async fn delete_order(&self, order_id: i64) -> Result<bool, OrderFlowError> {
        self.db.delete_order(order_id).await
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
