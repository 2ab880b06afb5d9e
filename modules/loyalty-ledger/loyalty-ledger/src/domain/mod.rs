//! Domain layer: accounting rules, the storage port and the service that
//! enforces the ledger invariants on top of it.
//!
//! The domain layer **MUST NOT** import `api::*` or `infra::*`; storage is
//! reached only through [`store::LedgerStore`].

pub mod accounting;
pub mod error;
pub mod service;
pub mod store;

#[cfg(test)]
mod service_test;
