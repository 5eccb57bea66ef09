//! API configuration

use serde::Deserialize;
use thiserror::Error;

use core_kernel::{Currency, MoneyError, PartyId};
use domain_billing::BillingConfig;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Party id of the ledger administrator
    pub admin_id: String,
    /// Ledger currency code
    pub currency: String,
    /// Log level
    pub log_level: String,
}

/// Configuration that cannot be loaded or does not describe a usable ledger
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid admin_id '{0}': expected a party UUID")]
    InvalidAdministrator(String),

    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            admin_id: String::new(),
            currency: "ETH".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_`-prefixed environment variables
    ///
    /// Unset variables fall back to [`ApiConfig::default`]. `admin_id` has
    /// no usable default and must be provided.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("jwt_expiration_secs", defaults.jwt_expiration_secs as i64)?
            .set_default("admin_id", defaults.admin_id)?
            .set_default("currency", defaults.currency)?
            .set_default("log_level", defaults.log_level)?
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the configured administrator
    pub fn administrator(&self) -> Result<PartyId, ConfigError> {
        self.admin_id
            .parse()
            .map_err(|_| ConfigError::InvalidAdministrator(self.admin_id.clone()))
    }

    /// Parses the configured ledger currency
    pub fn ledger_currency(&self) -> Result<Currency, ConfigError> {
        self.currency
            .parse()
            .map_err(|e: MoneyError| ConfigError::InvalidCurrency(e.to_string()))
    }

    /// Builds the ledger settings from this configuration
    pub fn billing_config(&self) -> Result<BillingConfig, ConfigError> {
        Ok(BillingConfig {
            administrator: self.administrator()?,
            currency: self.ledger_currency()?,
        })
    }
}
