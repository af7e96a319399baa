//! # Parts marketplace server
//!
//! The HTTP surface for the marketplace's authentication, authorization and order/payment subsystem. It is
//! responsible for:
//! * issuing and verifying the bearer tokens that identify users ([`auth`]),
//! * gating protected routes on a valid token ([`middleware`]) and deciding whether the verified identity may
//!   perform the specific operation ([`authorizer`]),
//! * the order and payment endpoints, which delegate to the `parts_market_engine` APIs and to the payment
//!   processor client in `stripe_tools`.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.

pub mod auth;
pub mod authorizer;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
