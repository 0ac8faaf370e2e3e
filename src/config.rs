//! Ledger configuration loaded from TOML
//!
//! ```toml
//! base_currency = "USD"
//! foreign_currency = "ZWG"
//! conversion_scale = 2
//!
//! [logging]
//! filter = "school_ledger=debug"
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::types::*;

/// Settings shared by every ledger operation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Currency owed balances are kept in
    pub base_currency: Currency,
    /// Currency converted with the daily rate before touching a balance
    pub foreign_currency: Currency,
    /// Decimal places converted amounts are rounded to; exact when unset
    pub conversion_scale: Option<i64>,
    pub logging: LoggingConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_currency: Currency::Usd,
            foreign_currency: Currency::Zwg,
            conversion_scale: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// Check the settings are usable together
    pub fn validate(&self) -> LedgerResult<()> {
        if self.base_currency == self.foreign_currency {
            return Err(LedgerError::Config(format!(
                "Base and foreign currency are both {}",
                self.base_currency
            )));
        }

        if let Some(scale) = self.conversion_scale {
            if !(0..=18).contains(&scale) {
                return Err(LedgerError::Config(format!(
                    "Conversion scale must be between 0 and 18, got {scale}"
                )));
            }
        }

        Ok(())
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Parse and validate a configuration from TOML text
pub fn parse_config(contents: &str) -> LedgerResult<LedgerConfig> {
    let config: LedgerConfig = toml::from_str(contents)
        .map_err(|e| LedgerError::Config(format!("Failed to parse ledger config: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Load a configuration file
pub fn load_config<P: AsRef<Path>>(path: P) -> LedgerResult<LedgerConfig> {
    let path = path.as_ref();
    tracing::debug!("Loading ledger configuration from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| {
        LedgerError::Config(format!("Failed to read config file {:?}: {e}", path))
    })?;
    parse_config(&contents)
}
