//! Widget configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `DISPASO_CART_DIR` - Directory backing the file store (default: `.dispaso`)
//! - `DISPASO_STORAGE_KEY` - Key holding the persisted cart (default: `dispasoCart`); must be a
//!   valid file name for the store: ASCII letters, digits, `-`, `_` and `.`, not leading `.`
//! - `DISPASO_PROCESSING_DELAY_MS` - Simulated payment processing delay (default: 600)
//! - `DISPASO_FEEDBACK_MS` - How long the "Added to cart" toast stays up (default: 2000)
//! - `DISPASO_CURRENCY` - Display currency code (default: INR)
//! - `DISPASO_IMAGE_DIR` - Base path for product images (default: `./images`)

use std::path::PathBuf;
use std::time::Duration;

use dispaso_core::CurrencyCode;
use thiserror::Error;

use crate::store::FileStore;

const DEFAULT_CART_DIR: &str = ".dispaso";
const DEFAULT_STORAGE_KEY: &str = "dispasoCart";
const DEFAULT_PROCESSING_DELAY_MS: u64 = 600;
const DEFAULT_FEEDBACK_MS: u64 = 2000;
const DEFAULT_IMAGE_DIR: &str = "./images";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart widget configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Directory holding the file-backed store
    pub cart_dir: PathBuf,
    /// Key under which the whole cart is persisted
    pub storage_key: String,
    /// Delay before a submitted payment completes
    pub processing_delay: Duration,
    /// Lifetime of the add-to-cart feedback toast
    pub feedback_duration: Duration,
    /// Currency used when formatting prices
    pub currency: CurrencyCode,
    /// Base path for product and placeholder images
    pub image_dir: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            cart_dir: PathBuf::from(DEFAULT_CART_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            processing_delay: Duration::from_millis(DEFAULT_PROCESSING_DELAY_MS),
            feedback_duration: Duration::from_millis(DEFAULT_FEEDBACK_MS),
            currency: CurrencyCode::default(),
            image_dir: DEFAULT_IMAGE_DIR.to_string(),
        }
    }
}

impl WidgetConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let cart_dir = lookup("DISPASO_CART_DIR").map_or(defaults.cart_dir, PathBuf::from);

        let storage_key = match lookup("DISPASO_STORAGE_KEY") {
            Some(key) if !FileStore::is_valid_key(&key) => {
                return Err(ConfigError::InvalidEnvVar(
                    "DISPASO_STORAGE_KEY".to_string(),
                    format!("{key:?} is not a valid store key"),
                ));
            }
            Some(key) => key,
            None => defaults.storage_key,
        };

        let processing_delay = get_millis(&lookup, "DISPASO_PROCESSING_DELAY_MS")?
            .unwrap_or(defaults.processing_delay);
        let feedback_duration =
            get_millis(&lookup, "DISPASO_FEEDBACK_MS")?.unwrap_or(defaults.feedback_duration);

        let currency = lookup("DISPASO_CURRENCY")
            .map(|raw| {
                raw.parse::<CurrencyCode>()
                    .map_err(|e| ConfigError::InvalidEnvVar("DISPASO_CURRENCY".to_string(), e))
            })
            .transpose()?
            .unwrap_or(defaults.currency);

        let image_dir = lookup("DISPASO_IMAGE_DIR")
            .map(|dir| dir.trim_end_matches('/').to_string())
            .unwrap_or(defaults.image_dir);

        Ok(Self {
            cart_dir,
            storage_key,
            processing_delay,
            feedback_duration,
            currency,
            image_dir,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional millisecond duration.
fn get_millis<F>(lookup: &F, key: &str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}
