use loyalty_ledger_sdk::{Customer, Merchant, PointsTransaction, Redemption};
use rust_decimal::Decimal;

use crate::domain::error::DomainError;
use crate::infra::storage::entity::{customer, merchant, redemption, transaction};

fn parse_decimal(column: &str, raw: &str) -> Result<Decimal, DomainError> {
    raw.parse::<Decimal>()
        .map_err(|e| DomainError::store(format!("invalid decimal in {column}: {raw:?}: {e}")))
}

impl From<customer::Model> for Customer {
    fn from(m: customer::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            phone: m.phone,
            total_points: m.total_points,
            created_at: m.created_at,
        }
    }
}

impl TryFrom<merchant::Model> for Merchant {
    type Error = DomainError;

    fn try_from(m: merchant::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            points_rate: parse_decimal("merchants.points_rate", &m.points_rate)?,
            id: m.id,
            name: m.name,
            shop_name: m.shop_name,
            phone: m.phone,
            category: m.category,
            address: m.address,
            wallet_balance: m.wallet_balance,
            is_active: m.is_active,
            created_at: m.created_at,
        })
    }
}

impl TryFrom<transaction::Model> for PointsTransaction {
    type Error = DomainError;

    fn try_from(m: transaction::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            amount: parse_decimal("points_transactions.amount", &m.amount)?,
            id: m.id,
            merchant_id: m.merchant_id,
            customer_id: m.customer_id,
            points_earned: m.points_earned,
            created_at: m.created_at,
        })
    }
}

impl From<redemption::Model> for Redemption {
    fn from(m: redemption::Model) -> Self {
        Self {
            id: m.id,
            merchant_id: m.merchant_id,
            customer_id: m.customer_id,
            points_used: m.points_used,
            discount: m.discount,
            created_at: m.created_at,
        }
    }
}

/// Full row for a new merchant. The wallet column is written only here and
/// by the guarded balance updates.
#[must_use]
pub fn merchant_row(m: &Merchant) -> merchant::Model {
    merchant::Model {
        id: m.id,
        name: m.name.clone(),
        shop_name: m.shop_name.clone(),
        phone: m.phone.clone(),
        category: m.category.clone(),
        address: m.address.clone(),
        points_rate: m.points_rate.normalize().to_string(),
        wallet_balance: m.wallet_balance,
        is_active: m.is_active,
        created_at: m.created_at,
    }
}

#[must_use]
pub fn customer_row(c: &Customer) -> customer::Model {
    customer::Model {
        id: c.id,
        name: c.name.clone(),
        phone: c.phone.clone(),
        total_points: c.total_points,
        created_at: c.created_at,
    }
}

#[must_use]
pub fn transaction_row(t: &PointsTransaction) -> transaction::Model {
    transaction::Model {
        id: t.id,
        merchant_id: t.merchant_id,
        customer_id: t.customer_id,
        amount: t.amount.normalize().to_string(),
        points_earned: t.points_earned,
        created_at: t.created_at,
    }
}

#[must_use]
pub fn redemption_row(r: &Redemption) -> redemption::Model {
    redemption::Model {
        id: r.id,
        merchant_id: r.merchant_id,
        customer_id: r.customer_id,
        points_used: r.points_used,
        discount: r.discount,
        created_at: r.created_at,
    }
}
