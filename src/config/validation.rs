//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check identifiers parse as object ids and keys decode as keys
//! - Validate value ranges (timeouts > 0, budgets > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::blockchain::types::ObjectId;
use crate::blockchain::wallet::Wallet;
use crate::config::schema::AppConfig;

/// One semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} is not a valid object id: {value}")]
    InvalidObjectId { field: &'static str, value: String },

    #[error("{field} is not a usable private key: {reason}")]
    InvalidKey { field: &'static str, reason: String },

    #[error("{field} is not a valid URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("gas.budget ({budget}) exceeds gas.max_budget ({max})")]
    BudgetAboveMax { budget: u64, max: u64 },
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.contract.package_id.is_empty() {
        errors.push(ValidationError::Missing("PACKAGE_ID"));
    } else if config.contract.package_id.parse::<ObjectId>().is_err() {
        errors.push(ValidationError::InvalidObjectId {
            field: "PACKAGE_ID",
            value: config.contract.package_id.clone(),
        });
    }

    if !config.contract.cash_registry.is_empty()
        && config.contract.cash_registry.parse::<ObjectId>().is_err()
    {
        errors.push(ValidationError::InvalidObjectId {
            field: "CASH_REGISTRY",
            value: config.contract.cash_registry.clone(),
        });
    }

    for (field, key) in [
        ("ADMIN_PRIVATE_KEY", &config.signers.admin_key),
        ("CUSTOMER_PRIVATE_KEY", &config.signers.customer_key),
    ] {
        if let Some(key) = key {
            if let Err(e) = Wallet::from_base64(key) {
                errors.push(ValidationError::InvalidKey {
                    field,
                    reason: e.to_string(),
                });
            }
        }
    }

    let urls = std::iter::once(("SUI_NETWORK", config.network.resolved_rpc_url())).chain(
        config
            .network
            .failover_urls
            .iter()
            .map(|u| ("network.failover_urls", u.clone())),
    );
    for (field, value) in urls {
        if value.parse::<url::Url>().is_err() {
            errors.push(ValidationError::InvalidUrl { field, value });
        }
    }

    if config.network.rpc_timeout_secs == 0 {
        errors.push(ValidationError::Zero("network.rpc_timeout_secs"));
    }
    if config.gas.max_budget == 0 {
        errors.push(ValidationError::Zero("gas.max_budget"));
    }
    match config.gas.budget {
        Some(0) => errors.push(ValidationError::Zero("gas.budget")),
        Some(budget) if budget > config.gas.max_budget => {
            errors.push(ValidationError::BudgetAboveMax {
                budget,
                max: config.gas.max_budget,
            })
        }
        _ => {}
    }
    if config.coffee.price_mist == 0 {
        errors.push(ValidationError::Zero("coffee.price_mist"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AppConfig {
        let mut config = AppConfig::default();
        config.contract.package_id = "0xc0ffee".to_string();
        config
    }

    #[test]
    fn test_minimal_config_is_valid() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AppConfig::default();
        config.contract.cash_registry = "registry".to_string();
        config.network.rpc_url = "not a url".to_string();
        config.network.rpc_timeout_secs = 0;
        config.signers.admin_key = Some("???".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::Missing("PACKAGE_ID")));
        assert!(errors.contains(&ValidationError::Zero("network.rpc_timeout_secs")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidObjectId { field: "CASH_REGISTRY", .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidKey { field: "ADMIN_PRIVATE_KEY", .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidUrl { field: "SUI_NETWORK", .. })));
    }

    #[test]
    fn test_budget_bounds() {
        let mut config = valid();
        config.gas.budget = Some(config.gas.max_budget + 1);
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::BudgetAboveMax { .. }));
    }
}
