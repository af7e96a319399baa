use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use pms_common::UsdCents;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------     EmailAddress       -------------------------------------------------------
/// A lightweight wrapper around the email string that keys user accounts and orders.
///
/// Emails are stored and compared exactly as supplied. No normalization or case folding is applied, so
/// `A@x.com` and `a@x.com` are two different identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn new<S: Into<String>>(email: S) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for EmailAddress {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for EmailAddress {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EmailAddress {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------        Role        -----------------------------------------------------------
/// The marketplace has exactly two privilege levels. Anything that is not an admin is a plain user, including
/// accounts whose stored role string is unrecognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid role: {0}")]
pub struct RoleConversionError(String);

impl FromStr for Role {
    type Err = RoleConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            s => Err(RoleConversionError(s.to_string())),
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Unrecognized role '{value}' treated as a plain user");
            Role::User
        })
    }
}

//--------------------------------------     UserAccount       --------------------------------------------------------
/// A registered identity. The profile document is whatever the client sent at login, stored verbatim; only the
/// email and role columns are ever queried.
#[derive(Debug, Clone, Serialize)]
pub struct UserAccount {
    pub id: i64,
    pub email: EmailAddress,
    pub role: Role,
    pub profile: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------    UpsertOutcome      --------------------------------------------------------
/// Whether an upsert-style write created a fresh record or overwrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

impl Display for UpsertOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpsertOutcome::Created => write!(f, "created"),
            UpsertOutcome::Updated => write!(f, "updated"),
        }
    }
}

//--------------------------------------        Order       -----------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub email: EmailAddress,
    pub part: String,
    pub quantity: i64,
    pub total_price: UsdCents,
    pub delivery_address: Option<String>,
    pub phone: Option<String>,
    pub paid: bool,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewOrder       ----------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// The email of the buyer, as supplied by the client. No check is made that a matching account exists.
    pub email: EmailAddress,
    /// The part being ordered
    pub part: String,
    /// Number of units
    pub quantity: i64,
    /// The total price of the order
    pub total_price: UsdCents,
    pub delivery_address: Option<String>,
    pub phone: Option<String>,
}

impl NewOrder {
    pub fn new(email: EmailAddress, part: String, quantity: i64, total_price: UsdCents) -> Self {
        Self { email, part, quantity, total_price, delivery_address: None, phone: None }
    }
}

//--------------------------------------      NewPayment      ---------------------------------------------------------
/// A completed payment as reported by the client after the payment processor confirms the charge.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub email: EmailAddress,
    /// The transaction identifier assigned by the payment processor
    pub txid: String,
    pub amount: UsdCents,
    /// Whatever else the client reported about the charge (card metadata etc.), kept verbatim
    pub detail: Value,
}

impl NewPayment {
    pub fn new(email: EmailAddress, txid: String, amount: UsdCents) -> Self {
        Self { email, txid, amount, detail: Value::Null }
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }
}

//--------------------------------------       Payment       ----------------------------------------------------------
/// An append-only receipt row. Written once when an order is settled and never modified afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub email: EmailAddress,
    pub txid: String,
    pub amount: UsdCents,
    pub detail: Value,
    pub created_at: DateTime<Utc>,
}
