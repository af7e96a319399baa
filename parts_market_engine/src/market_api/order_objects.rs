use pms_common::UsdCents;
use serde::{Deserialize, Serialize};

use crate::db_types::{EmailAddress, Order};

/// The orders belonging to one email, with the sum of their values. This is the shape returned by the
/// "my orders" endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResult {
    pub email: EmailAddress,
    pub total_orders: UsdCents,
    pub orders: Vec<Order>,
}
