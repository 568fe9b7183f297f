use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_CURRENCY_CODE: &str = "KES";
const DEFAULT_LOCALE: &str = "en-KE";
const DEFAULT_PHONE_COUNTRY: &str = "KE";
const DEFAULT_API_ENDPOINT: &str = "http://localhost:8080";
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Checkout configuration with validation.
///
/// Carries the organization context the orchestrator needs (tax rate,
/// currency, phone country profile, terminal location) so it can be
/// constructed explicitly instead of read from ambient globals.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CheckoutConfig {
    /// ISO 4217 currency code used for display formatting
    #[serde(default = "default_currency_code")]
    pub currency_code: String,

    /// BCP 47 locale tag used for display formatting
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Tax rate as a fraction (e.g. 0.16); totals are tax-inclusive
    #[serde(default)]
    #[validate(custom = "validate_tax_rate")]
    pub tax_rate: f64,

    /// Country key selecting the phone profile (e.g. "KE", "UG", "NG")
    #[serde(default = "default_phone_country")]
    pub phone_country: String,

    /// Base URL for payment links and the mobile-payment initiation endpoint
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,

    /// Terminal location attached to every order, if the org has one
    #[serde(default)]
    pub location_id: Option<Uuid>,

    /// Deadline in seconds for awaiting a mobile-payment confirmation.
    /// `None` waits indefinitely, matching the observed terminal behavior.
    #[serde(default)]
    pub confirmation_timeout_secs: Option<u64>,

    /// Capacity of the internal event channel
    #[serde(default = "default_event_channel_capacity")]
    #[validate(custom = "validate_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,
}

fn default_currency_code() -> String {
    DEFAULT_CURRENCY_CODE.to_string()
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_phone_country() -> String {
    DEFAULT_PHONE_COUNTRY.to_string()
}

fn default_api_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_event_channel_capacity() -> usize {
    DEFAULT_EVENT_CHANNEL_CAPACITY
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            currency_code: default_currency_code(),
            locale: default_locale(),
            tax_rate: 0.0,
            phone_country: default_phone_country(),
            api_endpoint: default_api_endpoint(),
            location_id: None,
            confirmation_timeout_secs: None,
            event_channel_capacity: default_event_channel_capacity(),
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl CheckoutConfig {
    /// Tax rate as a `Decimal` fraction; validation guarantees the
    /// conversion cannot fail for a loaded config.
    pub fn tax_rate(&self) -> Decimal {
        Decimal::try_from(self.tax_rate).unwrap_or_default()
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

fn validate_tax_rate(rate: f64) -> Result<(), ValidationError> {
    if !rate.is_finite() || rate < 0.0 || rate >= 1.0 {
        let mut err = ValidationError::new("tax_rate");
        err.message = Some("tax_rate must be a finite fraction in [0.0, 1.0)".into());
        return Err(err);
    }
    Ok(())
}

fn validate_event_channel_capacity(capacity: usize) -> Result<(), ValidationError> {
    if capacity == 0 {
        let mut err = ValidationError::new("event_channel_capacity");
        err.message = Some("event_channel_capacity must be greater than 0".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum CheckoutConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

const CONFIG_DIR: &str = "config";

/// Loads checkout configuration.
///
/// Layers configuration sources in this order:
/// 1. Default config (config/default.toml)
/// 2. Environment-specific config (config/{env}.toml)
/// 3. Environment variables (POS__*)
pub fn load_config() -> Result<CheckoutConfig, CheckoutConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("currency_code", DEFAULT_CURRENCY_CODE)?
        .set_default("locale", DEFAULT_LOCALE)?
        .set_default("tax_rate", 0.0)?
        .set_default("phone_country", DEFAULT_PHONE_COUNTRY)?
        .set_default("api_endpoint", DEFAULT_API_ENDPOINT)?
        .set_default("event_channel_capacity", DEFAULT_EVENT_CHANNEL_CAPACITY as u64)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("POS").separator("__"))
        .build()?;

    let cfg: CheckoutConfig = config.try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("pos_checkout={}", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_are_valid() {
        let cfg = CheckoutConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.currency_code, "KES");
        assert_eq!(cfg.tax_rate(), Decimal::ZERO);
    }

    #[test]
    fn tax_rate_must_be_a_fraction() {
        let mut cfg = CheckoutConfig::default();
        cfg.tax_rate = 0.16;
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.tax_rate(), dec!(0.16));

        cfg.tax_rate = 1.5;
        assert!(cfg.validate().is_err());
        cfg.tax_rate = -0.1;
        assert!(cfg.validate().is_err());
        cfg.tax_rate = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_event_channel_capacity_is_rejected() {
        let mut cfg = CheckoutConfig::default();
        cfg.event_channel_capacity = 0;
        assert!(cfg.validate().is_err());
    }
}
