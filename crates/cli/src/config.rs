//! Shopfront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SHOPFRONT_DATA_DIR` - Directory holding the cart snapshot (default: .shopfront)
//! - `SHOPFRONT_SNAPSHOT_KEY` - Name of the snapshot record, `[A-Za-z0-9_-]+` (default: shoppingCart)
//! - `SHOPFRONT_CHECKOUT_DELAY_MS` - Confirmation delay before the cart clears (default: 3000)
//! - `RUST_LOG` - Log filter (default: `shopfront_cli=info,shopfront_cart=info`)

use std::path::PathBuf;
use std::time::Duration;

use shopfront_cart::{DEFAULT_SNAPSHOT_KEY, is_valid_key};
use thiserror::Error;

const DEFAULT_DATA_DIR: &str = ".shopfront";
const DEFAULT_CHECKOUT_DELAY_MS: u64 = 3000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shopfront configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopConfig {
    /// Directory for the file-backed key-value store
    pub data_dir: PathBuf,
    /// Snapshot record name inside the store
    pub snapshot_key: String,
    /// Delay between "order confirmed" and the cart clearing
    pub checkout_delay: Duration,
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = lookup("SHOPFRONT_DATA_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        let snapshot_key =
            lookup("SHOPFRONT_SNAPSHOT_KEY").unwrap_or_else(|| DEFAULT_SNAPSHOT_KEY.to_string());
        if !is_valid_key(&snapshot_key) {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPFRONT_SNAPSHOT_KEY".to_string(),
                "must be non-empty and contain only ASCII letters, digits, '-' or '_'"
                    .to_string(),
            ));
        }

        let checkout_delay_ms = lookup("SHOPFRONT_CHECKOUT_DELAY_MS")
            .map_or(Ok(DEFAULT_CHECKOUT_DELAY_MS), |raw| {
                raw.trim().parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "SHOPFRONT_CHECKOUT_DELAY_MS".to_string(),
                        e.to_string(),
                    )
                })
            })?;

        Ok(Self {
            data_dir,
            snapshot_key,
            checkout_delay: Duration::from_millis(checkout_delay_ms),
        })
    }
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
            checkout_delay: Duration::from_millis(DEFAULT_CHECKOUT_DELAY_MS),
        }
    }
}
