//! Periodic position refresh.
//!
//! A [`Poller`] owns a background task that re-reads the emission rate and
//! every tracked account on a fixed interval. Start it when a view mounts
//! and stop (or drop) it when the view goes away.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval, MissedTickBehavior};

use crate::config::ConfigError;
use crate::gateway::StakingGateway;
use crate::ledger::StakingLedger;

pub struct Poller {
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawn the refresh loop at the ledger's configured interval.
    pub fn start<G: StakingGateway + 'static>(
        ledger: Arc<StakingLedger<G>>,
    ) -> Result<Self, ConfigError> {
        let period = ledger.config().poll_interval();
        Self::start_with_interval(ledger, period)
    }

    /// # Errors
    /// `ConfigError::Invalid` for a zero `period`.
    pub fn start_with_interval<G: StakingGateway + 'static>(
        ledger: Arc<StakingLedger<G>>,
        period: Duration,
    ) -> Result<Self, ConfigError> {
        if period.is_zero() {
            return Err(ConfigError::Invalid("poll interval must be greater than zero"));
        }
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                poll_once(&ledger).await;
            }
        });
        Ok(Self { handle })
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Refresh the rate and all tracked accounts once.
///
/// Accounts are read concurrently; one failing read does not affect the others.
pub async fn poll_once<G: StakingGateway + 'static>(ledger: &Arc<StakingLedger<G>>) {
    if let Err(err) = ledger.refresh_rate().await {
        warn!("reward rate refresh failed: {}", err);
    }

    let mut reads = JoinSet::new();
    for account in ledger.tracked_accounts() {
        let ledger = Arc::clone(ledger);
        reads.spawn(async move { (account, ledger.refresh(&account).await) });
    }
    while let Some(joined) = reads.join_next().await {
        match joined {
            Ok((account, Ok(_))) => debug!("polled {}", account),
            Ok((account, Err(err))) => warn!("poll of {} failed: {}", account, err),
            Err(err) => warn!("poll task failed: {}", err),
        }
    }
}
