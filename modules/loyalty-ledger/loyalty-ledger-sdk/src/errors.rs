//! Error types for the loyalty-ledger SDK.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    #[error("Merchant is not active")]
    Inactive,

    #[error("Merchant has insufficient wallet balance for rewards")]
    InsufficientMerchantFunds { required: i64, available: i64 },

    #[error("Insufficient points")]
    InsufficientPoints { requested: i64, available: i64 },

    #[error("Insufficient balance")]
    InsufficientBalance { requested: i64, available: i64 },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Store failure")]
    StoreFailure,
}

impl LedgerError {
    #[must_use]
    pub fn not_found(entity: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            key: key.into(),
        }
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn store_failure() -> Self {
        Self::StoreFailure
    }

    /// The balance the caller can still use, for the insufficient-* kinds.
    #[must_use]
    pub fn available(&self) -> Option<i64> {
        match self {
            Self::InsufficientMerchantFunds { available, .. }
            | Self::InsufficientPoints { available, .. }
            | Self::InsufficientBalance { available, .. } => Some(*available),
            _ => None,
        }
    }
}
