//! # Parts Market Engine
//!
//! The engine holds the storage and business logic for the marketplace's order and payment subsystem. It is
//! transport-agnostic; the HTTP server sits on top of the APIs exported here.
//!
//! The library is divided into two main sections:
//! 1. Database management and control. SQLite is the supported backend. You should never need to access the
//!    database directly; use the public API layer instead. The exception is the data types used in the database,
//!    which are defined in the [`db_types`] module and are public.
//! 2. The public API layer: [`AuthApi`] for identity records and role questions, [`AccountApi`] for read-only
//!    queries, and [`OrderFlowApi`] for the order lifecycle (submission and payment settlement). Backends implement
//!    the [`traits`] to plug into these APIs, which is also how the server's endpoint tests substitute mocks.
pub mod db_types;
mod market_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use market_api::{
    accounts_api::AccountApi,
    auth_api::AuthApi,
    order_flow_api::OrderFlowApi,
    order_objects,
};
pub use traits::{AccountApiError, AuthApiError, OrderFlowError};
