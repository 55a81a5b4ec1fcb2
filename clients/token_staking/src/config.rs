//! Ledger configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse ledger config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid ledger config: {0}")]
    Invalid(&'static str),
}

/// Tunables for [`StakingLedger`](crate::ledger::StakingLedger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Lock period enforced by the contract, in seconds.
    pub min_lock_seconds: i64,
    pub poll_interval_ms: u64,
    pub confirmation_timeout_ms: u64,
    pub token_decimals: u8,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            min_lock_seconds: MIN_LOCK_SECONDS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            confirmation_timeout_ms: DEFAULT_CONFIRMATION_TIMEOUT_MS,
            token_decimals: TOKEN_DECIMALS,
        }
    }
}

impl LedgerConfig {
    /// Parse a (possibly partial) JSON document over the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: LedgerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_lock_seconds < 0 {
            return Err(ConfigError::Invalid("min_lock_seconds must not be negative"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be greater than zero"));
        }
        if self.confirmation_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "confirmation_timeout_ms must be greater than zero",
            ));
        }
        if self.token_decimals != TOKEN_DECIMALS {
            return Err(ConfigError::Invalid("only 18-decimal tokens are supported"));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }
}
