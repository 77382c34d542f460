//! Application settings loading from config.toml
//!
//! This module loads authentication and business settings from a TOML file. Every
//! field has a default, so a missing file or a partial file is fine; only values that
//! are present but unusable (negative rates, a deposit above 100%) are rejected.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{path::Path, time::Duration};

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "CRM_CONFIG";

/// Config file used when `CRM_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Login and session settings
    pub auth: AuthSettings,
    /// Invoicing defaults
    pub business: BusinessSettings,
}

/// Settings for the session provider
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AuthSettings {
    /// Password shared by every demo account
    pub shared_secret: String,
    /// Simulated round-trip before a login attempt resolves
    pub login_delay_ms: u64,
    /// Name of the persisted session slot
    pub session_key: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            shared_secret: "demo123".to_string(),
            login_delay_ms: 1000,
            session_key: "taxidermy_user".to_string(),
        }
    }
}

impl AuthSettings {
    /// Login delay as a [`Duration`].
    #[must_use]
    pub const fn login_delay(&self) -> Duration {
        Duration::from_millis(self.login_delay_ms)
    }
}

/// Defaults used when issuing invoices
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BusinessSettings {
    /// Sales tax in percent (8.5 means 8.5%)
    pub tax_rate: f64,
    /// Discount in percent of the subtotal, applied when none is given (10 means 10%)
    pub default_discount: f64,
    /// Fraction of the subtotal requested as a deposit
    pub deposit_rate: f64,
    /// Days between issue date and due date
    pub invoice_terms_days: i64,
}

impl Default for BusinessSettings {
    fn default() -> Self {
        Self {
            tax_rate: 8.5,
            default_discount: 0.0,
            deposit_rate: 0.5,
            invoice_terms_days: 30,
        }
    }
}

impl BusinessSettings {
    /// Dollar discount that `default_discount` gives on `subtotal`.
    #[must_use]
    pub fn default_discount_on(&self, subtotal: f64) -> f64 {
        subtotal * self.default_discount / 100.0
    }
}

impl AppConfig {
    /// Rejects values that would produce nonsensical invoices.
    pub fn validate(&self) -> Result<()> {
        let business = &self.business;
        if !business.tax_rate.is_finite() || business.tax_rate < 0.0 {
            return Err(Error::Config {
                message: format!("tax_rate must be a non-negative number, got {}", business.tax_rate),
            });
        }
        if !(0.0..=100.0).contains(&business.default_discount) {
            return Err(Error::Config {
                message: format!(
                    "default_discount must be a percentage between 0 and 100, got {}",
                    business.default_discount
                ),
            });
        }
        if !(0.0..=1.0).contains(&business.deposit_rate) {
            return Err(Error::Config {
                message: format!(
                    "deposit_rate must be between 0 and 1, got {}",
                    business.deposit_rate
                ),
            });
        }
        if business.invoice_terms_days < 0 {
            return Err(Error::Config {
                message: format!(
                    "invoice_terms_days cannot be negative, got {}",
                    business.invoice_terms_days
                ),
            });
        }
        if self.auth.session_key.trim().is_empty() {
            return Err(Error::Config {
                message: "session_key cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Parses and validates configuration from a TOML string.
///
/// # Errors
/// Returns an error if the TOML syntax is invalid or a value fails validation.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value fails validation
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads configuration from `CRM_CONFIG` or `./config.toml`, falling back to defaults
/// when the file does not exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if Path::new(&path).exists() {
        let config = load_config(&path)?;
        tracing::info!("Loaded configuration from {}", path);
        Ok(config)
    } else {
        tracing::info!("No configuration file at {}, using defaults", path);
        Ok(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [auth]
            shared_secret = "letmein"
            login_delay_ms = 0
            session_key = "crm_session"

            [business]
            tax_rate = 8.0
            default_discount = 5.0
            deposit_rate = 0.25
            invoice_terms_days = 14
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.auth.shared_secret, "letmein");
        assert_eq!(config.auth.login_delay(), Duration::ZERO);
        assert_eq!(config.auth.session_key, "crm_session");
        assert_eq!(config.business.tax_rate, 8.0);
        assert_eq!(config.business.default_discount, 5.0);
        assert_eq!(config.business.deposit_rate, 0.25);
        assert_eq!(config.business.invoice_terms_days, 14);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_str = r"
            [business]
            tax_rate = 7.25
        ";

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.auth, AuthSettings::default());
        assert_eq!(config.business.tax_rate, 7.25);
        assert_eq!(config.business.deposit_rate, 0.5);
        assert_eq!(config.business.invoice_terms_days, 30);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.auth.shared_secret, "demo123");
        assert_eq!(config.auth.login_delay_ms, 1000);
    }

    #[test]
    fn test_rejects_deposit_rate_above_one() {
        let result = parse_config("[business]\ndeposit_rate = 1.5\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_default_discount_is_a_percentage() {
        let config = parse_config("[business]\ndefault_discount = 10.0\n").unwrap();
        assert_eq!(config.business.default_discount_on(450.0), 45.0);
        assert_eq!(BusinessSettings::default().default_discount_on(450.0), 0.0);

        let result = parse_config("[business]\ndefault_discount = 150.0\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_rejects_negative_tax_rate() {
        let result = parse_config("[business]\ntax_rate = -1.0\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let result = parse_config("[auth\nshared_secret = ");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("definitely/not/here/config.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
