use parts_market_engine::db_types::{EmailAddress, NewOrder, NewPayment, UpsertOutcome};
use pms_common::UsdCents;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::errors::OrderConversionError;

/// What the login endpoint returns: the store's upsert outcome plus a freshly signed access token for the email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    pub result: UpsertOutcome,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCheckResult {
    pub admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionResult {
    pub result: UpsertOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResult {
    pub deleted: bool,
}

/// The checkout page asks for a payment intent with the displayed price. The price arrives as a JSON number in
/// major units and is converted to cents on its decimal representation, so `19.99` charges exactly 1999.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    pub price: Number,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentResult {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

fn default_quantity() -> i64 {
    1
}

/// An order as submitted from the checkout form. Taken at face value: the server does not cross-check the price
/// against the listed part, nor the email against the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub email: EmailAddress,
    pub part: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    pub price: Number,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl TryFrom<OrderRequest> for NewOrder {
    type Error = OrderConversionError;

    fn try_from(req: OrderRequest) -> Result<Self, Self::Error> {
        let total_price = UsdCents::from_decimal_str(&req.price.to_string())
            .map_err(|e| OrderConversionError(e.to_string()))?;
        let mut order = NewOrder::new(req.email, req.part, req.quantity, total_price);
        order.delivery_address = req.address;
        order.phone = req.phone;
        Ok(order)
    }
}

/// A completed charge as reported by the checkout page once the payment processor confirms it. Everything beyond
/// the fields named here (card brand, last4, etc.) is kept verbatim in `detail`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub email: EmailAddress,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    pub price: Number,
    #[serde(flatten)]
    pub detail: Value,
}

impl TryFrom<PaymentRequest> for NewPayment {
    type Error = OrderConversionError;

    fn try_from(req: PaymentRequest) -> Result<Self, Self::Error> {
        let amount = UsdCents::from_decimal_str(&req.price.to_string())
            .map_err(|e| OrderConversionError(e.to_string()))?;
        Ok(NewPayment::new(req.email, req.transaction_id, amount).with_detail(req.detail))
    }
}
