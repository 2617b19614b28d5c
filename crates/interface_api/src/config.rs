//! API configuration

use config::ConfigError;
use serde::Deserialize;
use std::time::Duration;

use core_kernel::Timezone;
use domain_billing::PricingMode;

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
    /// Database URL
    pub database_url: String,
    /// Log level
    pub log_level: String,
    /// `text` or `json`
    pub log_format: String,
    /// How long a looked-up effective rate is served from memory
    pub rate_cache_ttl_secs: u64,
    pub history_default_page_size: u32,
    pub history_max_page_size: u32,
    /// `flat` or `tiered`
    pub pricing_mode: String,
    /// IANA zone used to derive the default billing month
    pub billing_timezone: String,
    /// Comma separated CORS origins; empty allows any
    pub allowed_origins: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 86_400,
            database_url: "postgres://localhost/voltbill".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            rate_cache_ttl_secs: 60,
            history_default_page_size: 10,
            history_max_page_size: 100,
            pricing_mode: "flat".to_string(),
            billing_timezone: "UTC".to_string(),
            allowed_origins: String::new(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables over the defaults
    ///
    /// `DATABASE_URL` overrides `API_DATABASE_URL` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", defaults.port)?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("jwt_expiration_secs", defaults.jwt_expiration_secs)?
            .set_default("database_url", defaults.database_url)?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", defaults.log_format)?
            .set_default("rate_cache_ttl_secs", defaults.rate_cache_ttl_secs)?
            .set_default("history_default_page_size", defaults.history_default_page_size)?
            .set_default("history_max_page_size", defaults.history_max_page_size)?
            .set_default("pricing_mode", defaults.pricing_mode)?
            .set_default("billing_timezone", defaults.billing_timezone)?
            .set_default("allowed_origins", defaults.allowed_origins)?
            .add_source(config::Environment::with_prefix("API"))
            .set_override_option("database_url", std::env::var("DATABASE_URL").ok())?
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// How long the effective flat rate is cached
    pub fn rate_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.rate_cache_ttl_secs)
    }

    /// Parses `pricing_mode` (`flat` or `tiered`)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Message` for any other value
    pub fn pricing_mode(&self) -> Result<PricingMode, ConfigError> {
        self.pricing_mode
            .parse()
            .map_err(|e: domain_billing::BillingError| ConfigError::Message(e.to_string()))
    }

    pub fn timezone(&self) -> Result<Timezone, ConfigError> {
        self.billing_timezone
            .parse()
            .map_err(|e: core_kernel::TemporalError| ConfigError::Message(e.to_string()))
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }

    /// Configured CORS origins, trimmed, without empty entries
    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Checks that every typed setting parses and page sizes are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pricing_mode()?;
        self.timezone()?;
        if self.history_max_page_size == 0 || self.history_default_page_size == 0 {
            return Err(ConfigError::Message("History page sizes must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pricing_mode().unwrap(), PricingMode::Flat);
        assert_eq!(config.rate_cache_ttl(), Duration::from_secs(60));
        assert!(config.origins().is_empty());
    }

    #[test]
    fn test_origins_split_and_trimmed() {
        let config = ApiConfig {
            allowed_origins: "https://a.example, ,https://b.example ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.origins(), ["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let config = ApiConfig {
            billing_timezone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tiered_mode_case_insensitive() {
        let config = ApiConfig {
            pricing_mode: "Tiered".to_string(),
            log_format: "JSON".to_string(),
            ..Default::default()
        };
        assert_eq!(config.pricing_mode().unwrap(), PricingMode::Tiered);
        assert!(config.json_logs());
    }
}
