use serde::{Deserialize, Serialize};

/// Ledger module configuration. Every field has a default, so an empty
/// `ledger:` section is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Name given to customers created implicitly by an earn without a name.
    #[serde(default = "default_customer_name")]
    pub default_customer_name: String,

    /// Recent transactions/redemptions returned with a customer lookup.
    #[serde(default = "default_customer_history_limit")]
    pub customer_history_limit: u64,

    /// Recent transactions/redemptions returned with a merchant lookup.
    #[serde(default = "default_merchant_history_limit")]
    pub merchant_history_limit: u64,

    /// Upper bound for history page sizes.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,

    #[serde(default = "default_max_field_length")]
    pub max_field_length: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_customer_name: default_customer_name(),
            customer_history_limit: default_customer_history_limit(),
            merchant_history_limit: default_merchant_history_limit(),
            max_page_size: default_max_page_size(),
            max_field_length: default_max_field_length(),
        }
    }
}

fn default_customer_name() -> String {
    "Customer".to_owned()
}

fn default_customer_history_limit() -> u64 {
    20
}

fn default_merchant_history_limit() -> u64 {
    10
}

fn default_max_page_size() -> u64 {
    100
}

fn default_max_field_length() -> usize {
    200
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let cfg: LedgerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, LedgerConfig::default());
        assert_eq!(cfg.default_customer_name, "Customer");
        assert_eq!(cfg.customer_history_limit, 20);
        assert_eq!(cfg.merchant_history_limit, 10);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<LedgerConfig, _> = serde_json::from_str(r#"{"history": 5}"#);
        assert!(result.is_err());
    }
}
