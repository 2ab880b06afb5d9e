#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Shared setup for the `SQLite`-backed integration tests

use std::sync::Arc;

use loyalty_ledger::domain::service::Service;
use loyalty_ledger::infra::storage::SeaOrmLedgerStore;
use loyalty_ledger::infra::storage::migrations::Migrator;
use loyalty_ledger::LedgerConfig;
use loyalty_ledger_sdk::{Merchant, NewMerchant, WalletAdjustment, WalletDirection};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;

pub type SqlService = Service<SeaOrmLedgerStore>;

/// Fresh in-memory database with the ledger schema applied.
///
/// The pool is pinned to one connection: every `SQLite` memory connection
/// is its own database.
pub async fn create_store() -> Arc<SeaOrmLedgerStore> {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("apply migrations");
    Arc::new(SeaOrmLedgerStore::new(db))
}

pub async fn create_service() -> Arc<SqlService> {
    Arc::new(Service::new(create_store().await, LedgerConfig::default()))
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub async fn funded_merchant(svc: &SqlService, shop: &str, rate: &str, wallet: i64) -> Merchant {
    let merchant = svc
        .create_merchant(NewMerchant {
            name: "Owner".to_owned(),
            shop_name: shop.to_owned(),
            phone: "9000000000".to_owned(),
            category: "Grocery".to_owned(),
            address: String::new(),
            points_rate: Some(dec(rate)),
        })
        .await
        .unwrap();
    svc.adjust_wallet(
        merchant.id,
        WalletAdjustment {
            amount: wallet,
            direction: WalletDirection::Add,
        },
    )
    .await
    .unwrap()
}
