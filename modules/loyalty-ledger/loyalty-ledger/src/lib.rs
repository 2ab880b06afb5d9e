//! Loyalty Ledger Module
//!
//! Points accounting for a multi-merchant rewards network: customers earn
//! points at one shop and redeem them at any other.
//!
//! ## Public API
//!
//! The public API is defined in the `loyalty-ledger-sdk` crate and re-exported here:
//! - `LoyaltyLedgerClientV1` - trait for in-process consumers
//! - `Customer`, `Merchant`, `PointsTransaction`, `Redemption` - data models
//! - `LedgerError` - error types
//!
//! `local_client::LocalClient` adapts the domain service to the SDK trait and
//! `api::rest::routes::register_routes` mounts the REST surface.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
// === PUBLIC API (from SDK) ===
pub use loyalty_ledger_sdk::{
    Customer, LedgerError, LoyaltyLedgerClientV1, Merchant, PointsTransaction, Redemption,
};

pub mod config;
pub use config::LedgerConfig;

// === LOCAL CLIENT ===
pub mod local_client;

// === INTERNAL MODULES ===
// Exposed for the server binary and integration tests.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
