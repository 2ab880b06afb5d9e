//! Ledger service.
//!
//! `orchestrator` holds the state-changing operations (earn, redeem,
//! registrations, wallet adjustments); each runs as one store unit of work.
//! `queries` holds the read side.

use std::sync::Arc;

use tracing::{error, warn};

use crate::config::LedgerConfig;
use crate::domain::error::DomainError;
use crate::domain::store::LedgerStore;

mod orchestrator;
mod queries;

/// Domain service for points accounting, generic over its store.
pub struct Service<S: LedgerStore> {
    store: Arc<S>,
    config: LedgerConfig,
}

impl<S: LedgerStore> Service<S> {
    #[must_use]
    pub fn new(store: Arc<S>, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Trim `value` and check it is non-empty and within the length limit.
    fn required_text(&self, field: &str, value: &str) -> Result<String, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation(field, "must not be empty"));
        }
        self.check_length(field, trimmed)?;
        Ok(trimmed.to_owned())
    }

    fn check_length(&self, field: &str, value: &str) -> Result<(), DomainError> {
        if value.chars().count() > self.config.max_field_length {
            return Err(DomainError::validation(
                field,
                format!(
                    "must be at most {} characters",
                    self.config.max_field_length
                ),
            ));
        }
        Ok(())
    }

    fn normalize_phone(&self, phone: &str) -> Result<String, DomainError> {
        self.required_text("phone", phone)
    }

    /// Effective page size for a history listing.
    fn page_limit(&self, requested: Option<u64>) -> u64 {
        let max = self.config.max_page_size.max(1);
        requested.unwrap_or(max).clamp(1, max)
    }
}

/// Log a failed operation at a level matching its cause.
fn log_failure(operation: &'static str, err: &DomainError) {
    match err {
        DomainError::Store { message } => {
            error!(operation, %message, "Ledger store failure");
        }
        other => warn!(operation, error = %other, "Ledger operation rejected"),
    }
}
