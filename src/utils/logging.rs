//! Tracing subscriber setup for binaries and demos embedding the ledger

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::types::*;

/// Install a formatted subscriber.
///
/// `RUST_LOG` wins over the configured filter when it is set.
pub fn init_logging(config: &LoggingConfig) -> LedgerResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter).map_err(|e| {
            LedgerError::Config(format!("Invalid log filter '{}': {e}", config.filter))
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| LedgerError::Config(format!("Failed to install log subscriber: {e}")))
}
