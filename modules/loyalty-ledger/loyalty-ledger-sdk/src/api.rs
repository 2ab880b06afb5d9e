//! `LoyaltyLedgerClientV1` trait definition.
//!
//! This trait defines the public API for the loyalty ledger (Version 1).
//! Writes (`earn`, `redeem`, wallet and merchant administration) are applied
//! atomically; reads may be briefly stale relative to concurrent writes.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::LedgerError;
use crate::models::{
    Customer, CustomerDetails, CustomerWithCounts, EarnReceipt, EarnRequest, HistoryQuery,
    Merchant, MerchantDetails, MerchantPatch, MerchantWithCounts, NewCustomer, NewMerchant, Page,
    PointsTransaction, RedeemReceipt, RedeemRequest, Redemption, WalletAdjustment,
};

/// Public API trait for the loyalty ledger (Version 1).
#[async_trait]
pub trait LoyaltyLedgerClientV1: Send + Sync {
    /// Find a customer by phone, creating it when unknown. Idempotent by phone.
    async fn register_customer(&self, new_customer: NewCustomer) -> Result<Customer, LedgerError>;

    /// All customers with activity counts, newest first.
    async fn list_customers(&self) -> Result<Vec<CustomerWithCounts>, LedgerError>;

    /// A customer with their most recent transactions and redemptions.
    async fn get_customer(&self, phone: &str) -> Result<CustomerDetails, LedgerError>;

    /// Register a merchant with an empty wallet.
    async fn create_merchant(&self, new_merchant: NewMerchant) -> Result<Merchant, LedgerError>;

    /// All merchants with activity counts, newest first.
    async fn list_merchants(&self) -> Result<Vec<MerchantWithCounts>, LedgerError>;

    /// A merchant with its most recent transactions and redemptions.
    async fn get_merchant(&self, id: Uuid) -> Result<MerchantDetails, LedgerError>;

    /// Apply a partial administrative update.
    async fn update_merchant(
        &self,
        id: Uuid,
        patch: MerchantPatch,
    ) -> Result<Merchant, LedgerError>;

    /// Top up or debit a merchant wallet.
    async fn adjust_wallet(
        &self,
        id: Uuid,
        adjustment: WalletAdjustment,
    ) -> Result<Merchant, LedgerError>;

    /// Convert a purchase into points, debiting the merchant wallet.
    async fn earn(&self, request: EarnRequest) -> Result<EarnReceipt, LedgerError>;

    /// Spend points as a discount at any active merchant.
    async fn redeem(&self, request: RedeemRequest) -> Result<RedeemReceipt, LedgerError>;

    /// Page through earn events, newest first.
    async fn list_transactions(
        &self,
        query: HistoryQuery,
    ) -> Result<Page<PointsTransaction>, LedgerError>;

    /// Page through redemptions, newest first.
    async fn list_redemptions(&self, query: HistoryQuery)
    -> Result<Page<Redemption>, LedgerError>;
}
