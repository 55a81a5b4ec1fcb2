use serde::{Deserialize, Serialize};

use crate::amount::TokenAmount;
use crate::constants::{DEFAULT_REWARD_RATE, MIN_LOCK_SECONDS};

/// Emission parameters shared by every position.
///
/// `rate_per_second` is a flat emission paid to whichever account's
/// `earned()` is queried; it is not divided by stake share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRateConfig {
    pub rate_per_second: TokenAmount,
    pub min_lock_seconds: i64,
}

impl Default for RewardRateConfig {
    fn default() -> Self {
        Self {
            rate_per_second: TokenAmount::from_units(DEFAULT_REWARD_RATE),
            min_lock_seconds: MIN_LOCK_SECONDS,
        }
    }
}
