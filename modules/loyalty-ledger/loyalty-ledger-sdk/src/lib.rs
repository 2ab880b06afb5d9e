//! Loyalty Ledger SDK
//!
//! This crate provides the public API for the loyalty-ledger module:
//! - `LoyaltyLedgerClientV1` trait for in-process consumers
//! - Model types (`Customer`, `Merchant`, `PointsTransaction`, `Redemption`, ...)
//! - Error type (`LedgerError`)
//!
//! Consumers hold the client behind an `Arc`:
//! ```ignore
//! let client: Arc<dyn LoyaltyLedgerClientV1> = ledger.client();
//! let receipt = client.earn(request).await?;
//! ```

#![forbid(unsafe_code)]

pub mod api;
pub mod errors;
pub mod models;

pub use api::LoyaltyLedgerClientV1;
pub use errors::LedgerError;
pub use models::{
    ActivityCounts, Customer, CustomerDetails, CustomerSummary, CustomerWithCounts, EarnReceipt,
    EarnRequest, HistoryQuery, Merchant, MerchantDetails, MerchantPatch, MerchantSummary,
    MerchantWithCounts, NewCustomer, NewMerchant, Page, PointsTransaction, RedeemReceipt,
    RedeemRequest, Redemption, RedemptionWithCustomer, RedemptionWithMerchant,
    TransactionWithCustomer, TransactionWithMerchant, WalletAdjustment, WalletDirection,
};
