//! # Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command-line flags (`--data-dir`, `--no-latency`)
//! 2. Environment variables (`QUICKCOMMERCE_*`)
//! 3. Defaults (this file)
//!
//! Configuration is read-only after startup.

use std::path::PathBuf;

use directories::ProjectDirs;
use quickcommerce_core::Money;
use serde::Serialize;

use crate::error::{CliError, CliResult};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Where the cart and service snapshots are stored.
    /// Default: the platform data directory (see [`default_data_dir`])
    pub data_dir: Option<PathBuf>,

    /// Store name shown in headers and receipts
    pub store_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Whether service calls sleep for their simulated latency
    pub simulate_latency: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: None,
            store_name: "QuickCommerce".to_string(),
            currency_symbol: "$".to_string(),
            simulate_latency: true,
        }
    }
}

impl AppConfig {
    /// Creates a config from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `QUICKCOMMERCE_DATA_DIR`: Override the data directory
    /// - `QUICKCOMMERCE_STORE_NAME`: Override the store name
    /// - `QUICKCOMMERCE_CURRENCY_SYMBOL`: Override the currency symbol
    /// - `QUICKCOMMERCE_NO_LATENCY`: Any value other than `0`/`false`
    ///   turns simulated latency off
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = AppConfig::default();

        if let Some(dir) = lookup("QUICKCOMMERCE_DATA_DIR").filter(|d| !d.trim().is_empty()) {
            config.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(name) = lookup("QUICKCOMMERCE_STORE_NAME") {
            config.store_name = name;
        }

        if let Some(symbol) = lookup("QUICKCOMMERCE_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(flag) = lookup("QUICKCOMMERCE_NO_LATENCY") {
            let flag = flag.trim().to_ascii_lowercase();
            if !matches!(flag.as_str(), "" | "0" | "false" | "no") {
                config.simulate_latency = false;
            }
        }

        config
    }

    /// The configured data directory, or the platform default.
    pub fn resolve_data_dir(&self) -> CliResult<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir()
                .ok_or_else(|| CliError::internal("Could not determine app data directory")),
        }
    }

    /// Formats money with the configured symbol.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = AppConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        format!(
            "{}{}{}.{:02}",
            if amount.is_negative() { "-" } else { "" },
            self.currency_symbol,
            amount.dollars().abs(),
            amount.cents_part().abs()
        )
    }
}

/// Platform data directory for QuickCommerce.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/dev.quickcommerce.quickcommerce`
/// - **Windows**: `%APPDATA%\quickcommerce\quickcommerce\data`
/// - **Linux**: `~/.local/share/quickcommerce`
pub fn default_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("dev", "quickcommerce", "quickcommerce").map(|d| d.data_dir().to_path_buf())
}
