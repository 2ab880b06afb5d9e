use loyalty_ledger_sdk::{
    ActivityCounts, Customer, CustomerDetails, CustomerSummary, CustomerWithCounts, EarnReceipt,
    EarnRequest, HistoryQuery, Merchant, MerchantDetails, MerchantPatch, MerchantSummary,
    MerchantWithCounts, NewCustomer, NewMerchant, Page, PointsTransaction, RedeemReceipt,
    RedeemRequest, Redemption, RedemptionWithCustomer, RedemptionWithMerchant,
    TransactionWithCustomer, TransactionWithMerchant, WalletAdjustment, WalletDirection,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

// ===== customers =====

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCustomerReq {
    #[serde(default)]
    pub name: String,
    pub phone: String,
}

impl From<RegisterCustomerReq> for NewCustomer {
    fn from(req: RegisterCustomerReq) -> Self {
        Self {
            name: req.name,
            phone: req.phone,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub total_points: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Customer> for CustomerDto {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            name: c.name,
            phone: c.phone,
            total_points: c.total_points,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct ActivityCountsDto {
    pub transactions: u64,
    pub redemptions: u64,
}

impl From<ActivityCounts> for ActivityCountsDto {
    fn from(c: ActivityCounts) -> Self {
        Self {
            transactions: c.transactions,
            redemptions: c.redemptions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerWithCountsDto {
    #[serde(flatten)]
    pub customer: CustomerDto,
    pub counts: ActivityCountsDto,
}

impl From<CustomerWithCounts> for CustomerWithCountsDto {
    fn from(c: CustomerWithCounts) -> Self {
        Self {
            customer: c.customer.into(),
            counts: c.counts.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MerchantSummaryDto {
    pub id: Uuid,
    pub shop_name: String,
    pub category: String,
}

impl From<MerchantSummary> for MerchantSummaryDto {
    fn from(m: MerchantSummary) -> Self {
        Self {
            id: m.id,
            shop_name: m.shop_name,
            category: m.category,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerSummaryDto {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
}

impl From<CustomerSummary> for CustomerSummaryDto {
    fn from(c: CustomerSummary) -> Self {
        Self {
            id: c.id,
            name: c.name,
            phone: c.phone,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionWithMerchantDto {
    #[serde(flatten)]
    pub transaction: TransactionDto,
    pub merchant: MerchantSummaryDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RedemptionWithMerchantDto {
    #[serde(flatten)]
    pub redemption: RedemptionDto,
    pub merchant: MerchantSummaryDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionWithCustomerDto {
    #[serde(flatten)]
    pub transaction: TransactionDto,
    pub customer: CustomerSummaryDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RedemptionWithCustomerDto {
    #[serde(flatten)]
    pub redemption: RedemptionDto,
    pub customer: CustomerSummaryDto,
}

impl From<TransactionWithMerchant> for TransactionWithMerchantDto {
    fn from(t: TransactionWithMerchant) -> Self {
        Self {
            transaction: t.transaction.into(),
            merchant: t.merchant.into(),
        }
    }
}

impl From<RedemptionWithMerchant> for RedemptionWithMerchantDto {
    fn from(r: RedemptionWithMerchant) -> Self {
        Self {
            redemption: r.redemption.into(),
            merchant: r.merchant.into(),
        }
    }
}

impl From<TransactionWithCustomer> for TransactionWithCustomerDto {
    fn from(t: TransactionWithCustomer) -> Self {
        Self {
            transaction: t.transaction.into(),
            customer: t.customer.into(),
        }
    }
}

impl From<RedemptionWithCustomer> for RedemptionWithCustomerDto {
    fn from(r: RedemptionWithCustomer) -> Self {
        Self {
            redemption: r.redemption.into(),
            customer: r.customer.into(),
        }
    }
}

/// A customer with their recent activity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerDetailsDto {
    #[serde(flatten)]
    pub customer: CustomerDto,
    pub transactions: Vec<TransactionWithMerchantDto>,
    pub redemptions: Vec<RedemptionWithMerchantDto>,
}

impl From<CustomerDetails> for CustomerDetailsDto {
    fn from(d: CustomerDetails) -> Self {
        Self {
            customer: d.customer.into(),
            transactions: d.transactions.into_iter().map(Into::into).collect(),
            redemptions: d.redemptions.into_iter().map(Into::into).collect(),
        }
    }
}

// ===== merchants =====

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMerchantReq {
    pub name: String,
    pub shop_name: String,
    pub phone: String,
    pub category: String,
    #[serde(default)]
    pub address: String,
    /// Defaults to 1 when omitted or zero.
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub points_rate: Option<Decimal>,
}

impl From<CreateMerchantReq> for NewMerchant {
    fn from(req: CreateMerchantReq) -> Self {
        Self {
            name: req.name,
            shop_name: req.shop_name,
            phone: req.phone,
            category: req.category,
            address: req.address,
            points_rate: req.points_rate,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMerchantReq {
    pub name: Option<String>,
    pub shop_name: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub points_rate: Option<Decimal>,
    pub is_active: Option<bool>,
}

impl From<UpdateMerchantReq> for MerchantPatch {
    fn from(req: UpdateMerchantReq) -> Self {
        Self {
            name: req.name,
            shop_name: req.shop_name,
            phone: req.phone,
            category: req.category,
            address: req.address,
            points_rate: req.points_rate,
            is_active: req.is_active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletDirectionDto {
    Add,
    Subtract,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct WalletAdjustmentReq {
    pub amount: i64,
    #[serde(rename = "type")]
    pub direction: WalletDirectionDto,
}

impl From<WalletAdjustmentReq> for WalletAdjustment {
    fn from(req: WalletAdjustmentReq) -> Self {
        Self {
            amount: req.amount,
            direction: match req.direction {
                WalletDirectionDto::Add => WalletDirection::Add,
                WalletDirectionDto::Subtract => WalletDirection::Subtract,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MerchantDto {
    pub id: Uuid,
    pub name: String,
    pub shop_name: String,
    pub phone: String,
    pub category: String,
    pub address: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub points_rate: Decimal,
    pub wallet_balance: i64,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Merchant> for MerchantDto {
    fn from(m: Merchant) -> Self {
        Self {
            id: m.id,
            name: m.name,
            shop_name: m.shop_name,
            phone: m.phone,
            category: m.category,
            address: m.address,
            points_rate: m.points_rate,
            wallet_balance: m.wallet_balance,
            is_active: m.is_active,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MerchantWithCountsDto {
    #[serde(flatten)]
    pub merchant: MerchantDto,
    pub counts: ActivityCountsDto,
}

impl From<MerchantWithCounts> for MerchantWithCountsDto {
    fn from(m: MerchantWithCounts) -> Self {
        Self {
            merchant: m.merchant.into(),
            counts: m.counts.into(),
        }
    }
}

/// A merchant with its recent activity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MerchantDetailsDto {
    #[serde(flatten)]
    pub merchant: MerchantDto,
    pub transactions: Vec<TransactionWithCustomerDto>,
    pub redemptions: Vec<RedemptionWithCustomerDto>,
}

impl From<MerchantDetails> for MerchantDetailsDto {
    fn from(d: MerchantDetails) -> Self {
        Self {
            merchant: d.merchant.into(),
            transactions: d.transactions.into_iter().map(Into::into).collect(),
            redemptions: d.redemptions.into_iter().map(Into::into).collect(),
        }
    }
}

// ===== earn / redeem =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub customer_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub points_earned: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<PointsTransaction> for TransactionDto {
    fn from(t: PointsTransaction) -> Self {
        Self {
            id: t.id,
            merchant_id: t.merchant_id,
            customer_id: t.customer_id,
            amount: t.amount,
            points_earned: t.points_earned,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionDto {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub customer_id: Uuid,
    pub points_used: i64,
    pub discount: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Redemption> for RedemptionDto {
    fn from(r: Redemption) -> Self {
        Self {
            id: r.id,
            merchant_id: r.merchant_id,
            customer_id: r.customer_id,
            points_used: r.points_used,
            discount: r.discount,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EarnReq {
    pub merchant_id: Uuid,
    pub customer_phone: String,
    pub customer_name: Option<String>,
    #[schema(value_type = f64)]
    pub amount: Decimal,
}

impl From<EarnReq> for EarnRequest {
    fn from(req: EarnReq) -> Self {
        Self {
            merchant_id: req.merchant_id,
            customer_phone: req.customer_phone,
            customer_name: req.customer_name,
            amount: req.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EarnResponse {
    pub transaction: TransactionDto,
    pub points_earned: i64,
    pub new_total_points: i64,
    pub message: String,
}

impl From<EarnReceipt> for EarnResponse {
    fn from(r: EarnReceipt) -> Self {
        Self {
            transaction: r.transaction.into(),
            points_earned: r.points_earned,
            new_total_points: r.new_total_points,
            message: r.message,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedeemReq {
    pub merchant_id: Uuid,
    pub customer_phone: String,
    pub points_to_redeem: i64,
}

impl From<RedeemReq> for RedeemRequest {
    fn from(req: RedeemReq) -> Self {
        Self {
            merchant_id: req.merchant_id,
            customer_phone: req.customer_phone,
            points_to_redeem: req.points_to_redeem,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    pub redemption: RedemptionDto,
    pub discount: i64,
    pub remaining_points: i64,
    pub message: String,
}

impl From<RedeemReceipt> for RedeemResponse {
    fn from(r: RedeemReceipt) -> Self {
        Self {
            redemption: r.redemption.into(),
            discount: r.discount,
            remaining_points: r.remaining_points,
            message: r.message,
        }
    }
}

// ===== history =====

/// Query string for `GET /transactions` and `GET /redemptions`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    pub merchant_id: Option<Uuid>,
    pub customer_phone: Option<String>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

impl From<HistoryParams> for HistoryQuery {
    fn from(p: HistoryParams) -> Self {
        Self {
            merchant_id: p.merchant_id,
            customer_phone: p.customer_phone,
            limit: p.limit,
            offset: p.offset,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionPageDto {
    pub items: Vec<TransactionDto>,
    pub limit: u64,
    pub offset: u64,
}

impl From<Page<PointsTransaction>> for TransactionPageDto {
    fn from(p: Page<PointsTransaction>) -> Self {
        Self {
            items: p.items.into_iter().map(Into::into).collect(),
            limit: p.limit,
            offset: p.offset,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RedemptionPageDto {
    pub items: Vec<RedemptionDto>,
    pub limit: u64,
    pub offset: u64,
}

impl From<Page<Redemption>> for RedemptionPageDto {
    fn from(p: Page<Redemption>) -> Self {
        Self {
            items: p.items.into_iter().map(Into::into).collect(),
            limit: p.limit,
            offset: p.offset,
        }
    }
}
