use loyalty_ledger_sdk::LedgerError;
use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror.
///
/// Business-rule variants (`Inactive`, `Insufficient*`, `Validation`) are
/// raised before any write is issued; `Store` wraps persistence failures.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Merchant is not active: {merchant_id}")]
    Inactive { merchant_id: Uuid },

    #[error(
        "Merchant has insufficient wallet balance for rewards: {required} points required, {available} available"
    )]
    InsufficientMerchantFunds { required: i64, available: i64 },

    #[error("Insufficient points: {requested} requested, {available} available")]
    InsufficientPoints { requested: i64, available: i64 },

    #[error("Insufficient balance: {requested} requested, {available} available")]
    InsufficientBalance { requested: i64, available: i64 },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Store failure: {message}")]
    Store { message: String },
}

impl DomainError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn customer_not_found(phone: &str) -> Self {
        Self::not_found("Customer", phone)
    }

    pub fn merchant_not_found(id: Uuid) -> Self {
        Self::not_found("Merchant", id)
    }

    pub fn inactive(merchant_id: Uuid) -> Self {
        Self::Inactive { merchant_id }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }
}

/// Convert domain errors to SDK errors for public API consumption.
impl From<DomainError> for LedgerError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { entity, key } => Self::not_found(entity, key),
            DomainError::Inactive { .. } => Self::Inactive,
            DomainError::InsufficientMerchantFunds {
                required,
                available,
            } => Self::InsufficientMerchantFunds {
                required,
                available,
            },
            DomainError::InsufficientPoints {
                requested,
                available,
            } => Self::InsufficientPoints {
                requested,
                available,
            },
            DomainError::InsufficientBalance {
                requested,
                available,
            } => Self::InsufficientBalance {
                requested,
                available,
            },
            DomainError::Validation { field, message } => {
                Self::validation(format!("{field}: {message}"))
            }
            DomainError::Store { .. } => Self::store_failure(),
        }
    }
}
