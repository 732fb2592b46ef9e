//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOCKTAKE_API_URL` - Base URL of the warehouse backend (e.g.,
//!   <https://warehouse.example.com>)
//! - `STOCKTAKE_API_TOKEN` - Bearer token for the backend API
//!
//! ## Optional
//! - `WAREHOUSE_UTC_OFFSET_HOURS` - Warehouse-local UTC offset in whole
//!   hours, used as the canonical calendar zone for the one-sheet-per-day
//!   rule (default: 7)

use chrono::FixedOffset;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default warehouse-local UTC offset (hours east).
const DEFAULT_UTC_OFFSET_HOURS: i32 = 7;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Warehouse backend client configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct StocktakeConfig {
    /// Base URL of the warehouse backend.
    pub api_url: Url,
    /// Bearer token for the backend API.
    pub api_token: SecretString,
    /// Warehouse-local UTC offset, the canonical calendar zone.
    pub local_offset: FixedOffset,
}

impl std::fmt::Debug for StocktakeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StocktakeConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_token", &"[REDACTED]")
            .field("local_offset", &self.local_offset)
            .finish()
    }
}

impl StocktakeConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = required("STOCKTAKE_API_URL")?;
        let api_url = Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("STOCKTAKE_API_URL".into(), e.to_string()))?;

        let api_token = SecretString::from(required("STOCKTAKE_API_TOKEN")?);

        let offset_hours = match std::env::var("WAREHOUSE_UTC_OFFSET_HOURS") {
            Ok(raw) => raw.parse::<i32>().map_err(|e| {
                ConfigError::InvalidEnvVar("WAREHOUSE_UTC_OFFSET_HOURS".into(), e.to_string())
            })?,
            Err(_) => DEFAULT_UTC_OFFSET_HOURS,
        };
        let local_offset = FixedOffset::east_opt(offset_hours * 3600).ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "WAREHOUSE_UTC_OFFSET_HOURS".into(),
                format!("{offset_hours} is out of range"),
            )
        })?;

        Ok(Self {
            api_url,
            api_token,
            local_offset,
        })
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}
