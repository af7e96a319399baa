use pms_common::{UsdCents, USD_CURRENCY_CODE};
use serde::{Deserialize, Serialize};

/// The subset of Stripe's payment intent object that the marketplace cares about. Everything else in the response is
/// ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub client_secret: Option<String>,
}

/// Request parameters for a new single-use payment intent.
#[derive(Debug, Clone)]
pub struct NewPaymentIntent {
    pub amount: UsdCents,
    pub currency: String,
    pub payment_method_types: Vec<String>,
}

impl NewPaymentIntent {
    /// A card-only payment intent in the marketplace's fixed currency.
    pub fn card(amount: UsdCents) -> Self {
        Self { amount, currency: USD_CURRENCY_CODE.to_string(), payment_method_types: vec!["card".to_string()] }
    }

    /// Stripe's REST API takes form-encoded bodies, with array parameters using the `key[]` convention.
    pub fn to_form_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("amount", self.amount.value().to_string()), ("currency", self.currency.clone())];
        for method in &self.payment_method_types {
            params.push(("payment_method_types[]", method.clone()));
        }
        params
    }
}
