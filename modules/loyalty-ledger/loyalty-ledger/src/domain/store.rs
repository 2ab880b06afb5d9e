//! Storage port for the ledger.
//!
//! Writes go through [`LedgerStore::transaction`]: the closure receives a
//! [`LedgerTx`] handle and every record it touches is committed together, or
//! not at all when the closure returns an error. Reads outside a unit of work
//! are plain lookups and may be briefly stale.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::BoxFuture;
use loyalty_ledger_sdk::{ActivityCounts, Customer, Merchant, PointsTransaction, Redemption};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Future returned by a unit-of-work closure.
pub type TxFuture<'a, T> = BoxFuture<'a, Result<T, DomainError>>;

/// Which records a history listing covers. `None` means unrestricted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub merchant_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
}

/// Operations available inside one atomic unit of work.
///
/// The debit methods are guarded: they return `None` and change nothing when
/// the current balance is lower than the requested amount.
#[async_trait]
pub trait LedgerTx: Send {
    async fn find_merchant(&mut self, id: Uuid) -> Result<Option<Merchant>, DomainError>;

    async fn insert_merchant(&mut self, merchant: &Merchant) -> Result<(), DomainError>;

    /// Persist every mutable field except the wallet balance.
    async fn update_merchant(&mut self, merchant: &Merchant) -> Result<(), DomainError>;

    async fn find_customer_by_phone(
        &mut self,
        phone: &str,
    ) -> Result<Option<Customer>, DomainError>;

    /// Insert `candidate` unless a customer with the same phone exists, then
    /// return whichever record owns the phone.
    async fn find_or_create_customer(
        &mut self,
        candidate: &Customer,
    ) -> Result<Customer, DomainError>;

    /// Add points to a wallet, returning the new balance.
    async fn credit_wallet(&mut self, merchant_id: Uuid, points: i64) -> Result<i64, DomainError>;

    /// Remove points from a wallet, returning the new balance.
    async fn debit_wallet(
        &mut self,
        merchant_id: Uuid,
        points: i64,
    ) -> Result<Option<i64>, DomainError>;

    /// Add points to a customer, returning the new total.
    async fn credit_customer(
        &mut self,
        customer_id: Uuid,
        points: i64,
    ) -> Result<i64, DomainError>;

    /// Remove points from a customer, returning the remaining total.
    async fn debit_customer(
        &mut self,
        customer_id: Uuid,
        points: i64,
    ) -> Result<Option<i64>, DomainError>;

    async fn insert_transaction(
        &mut self,
        transaction: &PointsTransaction,
    ) -> Result<(), DomainError>;

    async fn insert_redemption(&mut self, redemption: &Redemption) -> Result<(), DomainError>;
}

/// Durable record collections for customers, merchants, transactions and
/// redemptions.
#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    /// Run `work` as a single atomic unit.
    async fn transaction<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: for<'a> FnOnce(&'a mut dyn LedgerTx) -> TxFuture<'a, T> + Send + 'static;

    async fn find_customer_by_phone(&self, phone: &str) -> Result<Option<Customer>, DomainError>;

    async fn find_merchant(&self, id: Uuid) -> Result<Option<Merchant>, DomainError>;

    async fn find_customers(&self, ids: &[Uuid]) -> Result<Vec<Customer>, DomainError>;

    async fn find_merchants(&self, ids: &[Uuid]) -> Result<Vec<Merchant>, DomainError>;

    /// All customers, newest first.
    async fn list_customers(&self) -> Result<Vec<Customer>, DomainError>;

    /// All merchants, newest first.
    async fn list_merchants(&self) -> Result<Vec<Merchant>, DomainError>;

    /// Transaction/redemption counts per customer id. Customers without
    /// activity may be absent.
    async fn customer_activity_counts(&self)
    -> Result<HashMap<Uuid, ActivityCounts>, DomainError>;

    /// Transaction/redemption counts per merchant id.
    async fn merchant_activity_counts(&self)
    -> Result<HashMap<Uuid, ActivityCounts>, DomainError>;

    /// Earn events matching `filter`, newest first.
    async fn list_transactions(
        &self,
        filter: HistoryFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PointsTransaction>, DomainError>;

    /// Redemptions matching `filter`, newest first.
    async fn list_redemptions(
        &self,
        filter: HistoryFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Redemption>, DomainError>;
}
