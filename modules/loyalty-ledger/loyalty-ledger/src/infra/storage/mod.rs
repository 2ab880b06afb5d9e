//! Infrastructure storage layer.
//!
//! - `entity/` - `SeaORM` entity definitions
//! - `mapper.rs` - conversions between `SeaORM` models and SDK contract types
//! - `migrations/` - database schema migrations
//! - `sea_orm_store.rs` - the SQL-backed [`LedgerStore`](crate::domain::store::LedgerStore)
//! - `memory_store.rs` - an in-process store for tests and local runs
//!
//! Decimal values (purchase amounts and issuance rates) are stored as text so
//! they round-trip exactly on every backend.

mod db;
pub mod entity;
pub mod mapper;
pub mod memory_store;
pub mod migrations;
pub mod sea_orm_store;

pub use memory_store::InMemoryLedgerStore;
pub use sea_orm_store::SeaOrmLedgerStore;
