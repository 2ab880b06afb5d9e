//! Public models for the loyalty-ledger module.
//!
//! These are transport-agnostic data structures that define the contract
//! between the ledger and its consumers. Points are whole numbers; purchase
//! amounts and issuance rates are decimals.

use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

/// A customer, keyed externally by phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub total_points: i64,
    pub created_at: OffsetDateTime,
}

/// Registration data for a customer (find-or-create by phone).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
}

/// A participating shop with a prepaid points wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merchant {
    pub id: Uuid,
    pub name: String,
    pub shop_name: String,
    pub phone: String,
    pub category: String,
    pub address: String,
    /// Multiplier applied to the base rate of one point per 100 currency units.
    pub points_rate: Decimal,
    /// Prepaid budget, denominated in points. Never negative.
    pub wallet_balance: i64,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

/// Registration data for a merchant. The wallet always starts empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMerchant {
    pub name: String,
    pub shop_name: String,
    pub phone: String,
    pub category: String,
    pub address: String,
    /// Defaults to 1 when absent or zero.
    pub points_rate: Option<Decimal>,
}

/// Partial administrative update of a merchant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MerchantPatch {
    pub name: Option<String>,
    pub shop_name: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    pub points_rate: Option<Decimal>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletDirection {
    Add,
    Subtract,
}

/// Manual top-up or debit of a merchant wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletAdjustment {
    pub amount: i64,
    pub direction: WalletDirection,
}

/// An earn event. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsTransaction {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub customer_id: Uuid,
    pub amount: Decimal,
    pub points_earned: i64,
    pub created_at: OffsetDateTime,
}

/// A spend event. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub customer_id: Uuid,
    pub points_used: i64,
    pub discount: i64,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantSummary {
    pub id: Uuid,
    pub shop_name: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerSummary {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionWithMerchant {
    pub transaction: PointsTransaction,
    pub merchant: MerchantSummary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionWithMerchant {
    pub redemption: Redemption,
    pub merchant: MerchantSummary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionWithCustomer {
    pub transaction: PointsTransaction,
    pub customer: CustomerSummary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionWithCustomer {
    pub redemption: Redemption,
    pub customer: CustomerSummary,
}

/// A customer with their most recent activity, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub customer: Customer,
    pub transactions: Vec<TransactionWithMerchant>,
    pub redemptions: Vec<RedemptionWithMerchant>,
}

/// A merchant with its most recent activity, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantDetails {
    pub merchant: Merchant,
    pub transactions: Vec<TransactionWithCustomer>,
    pub redemptions: Vec<RedemptionWithCustomer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivityCounts {
    pub transactions: u64,
    pub redemptions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerWithCounts {
    pub customer: Customer,
    pub counts: ActivityCounts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantWithCounts {
    pub merchant: Merchant,
    pub counts: ActivityCounts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarnRequest {
    pub merchant_id: Uuid,
    pub customer_phone: String,
    /// Used only when the phone is not yet known.
    pub customer_name: Option<String>,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarnReceipt {
    pub transaction: PointsTransaction,
    pub points_earned: i64,
    pub new_total_points: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemRequest {
    pub merchant_id: Uuid,
    pub customer_phone: String,
    pub points_to_redeem: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemReceipt {
    pub redemption: Redemption,
    pub discount: i64,
    pub remaining_points: i64,
    pub message: String,
}

/// Filter and window for history listings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryQuery {
    pub merchant_id: Option<Uuid>,
    pub customer_phone: Option<String>,
    /// Clamped to the configured maximum page size.
    pub limit: Option<u64>,
    pub offset: u64,
}

/// One window of a history listing, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub limit: u64,
    pub offset: u64,
}
