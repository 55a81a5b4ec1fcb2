//! Client-side staking ledger.
//!
//! The ledger keeps the last confirmed position per account and drives
//! commands against the contract:
//!
//! 1. Refuse the command if another mutation for the account is in flight
//! 2. Refresh the cached position if it is missing or stale
//! 3. Validate locally with the position transitions
//! 4. Submit through the gateway and wait for confirmation
//! 5. Commit the projected position, then overwrite it with a forced read
//!
//! A revert leaves the last confirmed read in place. A confirmation that
//! does not arrive in time leaves the account `Unconfirmed` until the
//! transaction settles or the UI asks for a resync.
//!
//! Commands validate at the later of the caller's `now` and the chain time
//! of the last read. Accrual and the lock check both use that instant.

use std::sync::{Arc, Mutex, MutexGuard};

use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::clock::UnixTimestamp;
use indexmap::IndexMap;
use log::{debug, info, warn};
use tokio::time::timeout;

use crate::accrual::accrue;
use crate::amount::TokenAmount;
use crate::config::{ConfigError, LedgerConfig};
use crate::eligibility::{can_withdraw, lock_status, LockStatus};
use crate::error::{GatewayError, LedgerError, StakingError};
use crate::gateway::{PositionSnapshot, StakingGateway, TokenBalances, TransactionHandle, TxOutcome};
use crate::instructions::{self, ExitOutcome, Operation};
use crate::state::{RewardRateConfig, StakingPosition};

type Cache = Arc<Mutex<IndexMap<Pubkey, CacheEntry>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Whether an account's cached position agrees with submitted transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Synced,
    /// A command is between local validation and confirmation.
    Pending(Operation),
    /// A confirmation wait timed out; the outcome is not yet known.
    Unconfirmed(Operation),
}

/// What the UI renders for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayState {
    pub staked_amount: TokenAmount,
    /// Cached reward plus accrual since the last read.
    pub live_earned: TokenAmount,
    pub lock_status: LockStatus,
    pub pending_operation: Option<Operation>,
    pub unconfirmed: bool,
    /// The contract's own eligibility flag from the last read.
    pub contract_can_withdraw: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub total_staked: TokenAmount,
    pub rate_per_second: TokenAmount,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    /// Last confirmed position.
    position: StakingPosition,
    remote_can_withdraw: bool,
    sync: SyncState,
    /// Set once a mutation settles; the next command re-reads first.
    stale: bool,
}

impl CacheEntry {
    fn unread(account: Pubkey) -> Self {
        Self {
            position: StakingPosition::idle(account),
            remote_can_withdraw: false,
            sync: SyncState::Synced,
            stale: true,
        }
    }

    fn apply_snapshot(
        &mut self,
        account: Pubkey,
        snapshot: PositionSnapshot,
        min_lock_seconds: i64,
    ) {
        let position = snapshot.into_position(account);
        let local = can_withdraw(&position, min_lock_seconds, snapshot.observed_at);
        if local != snapshot.can_withdraw {
            warn!(
                "eligibility mismatch for {}: contract says {}, local lock rule says {}",
                account, snapshot.can_withdraw, local
            );
        }
        self.position = position;
        self.remote_can_withdraw = snapshot.can_withdraw;
        self.stale = false;
    }
}

/// Marks an account `Pending` for the lifetime of one command.
struct PendingGuard {
    cache: Cache,
    account: Pubkey,
    operation: Operation,
}

impl PendingGuard {
    fn acquire(cache: &Cache, account: Pubkey, operation: Operation) -> Result<Self, LedgerError> {
        let mut entries = lock(cache);
        let entry = entries
            .entry(account)
            .or_insert_with(|| CacheEntry::unread(account));
        match entry.sync {
            SyncState::Pending(operation) | SyncState::Unconfirmed(operation) => {
                return Err(LedgerError::OperationPending { operation });
            }
            SyncState::Synced => entry.sync = SyncState::Pending(operation),
        }
        Ok(Self {
            cache: Arc::clone(cache),
            account,
            operation,
        })
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let mut entries = lock(&self.cache);
        if let Some(entry) = entries.get_mut(&self.account) {
            // Unconfirmed outlives the command
            if entry.sync == SyncState::Pending(self.operation) {
                entry.sync = SyncState::Synced;
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Stake(TokenAmount),
    Withdraw(TokenAmount),
    Claim,
    Exit,
}

impl Command {
    fn operation(self) -> Operation {
        match self {
            Command::Stake(_) => Operation::Stake,
            Command::Withdraw(_) => Operation::Withdraw,
            Command::Claim => Operation::Claim,
            Command::Exit => Operation::Exit,
        }
    }

    /// Run the local transition for this command.
    fn plan(
        self,
        position: &StakingPosition,
        rates: &RewardRateConfig,
        now: UnixTimestamp,
    ) -> Result<ExitOutcome, StakingError> {
        let rate = rates.rate_per_second;
        let min_lock = rates.min_lock_seconds;
        match self {
            Command::Stake(amount) => Ok(ExitOutcome {
                withdrawn: TokenAmount::ZERO,
                claimed: TokenAmount::ZERO,
                position: instructions::stake(position, amount, rate, now)?,
            }),
            Command::Withdraw(amount) => Ok(ExitOutcome {
                withdrawn: amount,
                claimed: TokenAmount::ZERO,
                position: instructions::withdraw(position, amount, rate, min_lock, now)?,
            }),
            Command::Claim => {
                let (claimed, position) = instructions::claim(position, rate, now)?;
                Ok(ExitOutcome {
                    withdrawn: TokenAmount::ZERO,
                    claimed,
                    position,
                })
            }
            Command::Exit => instructions::exit(position, rate, min_lock, now),
        }
    }
}

/// Synchronized view of staking positions for one gateway.
///
/// Share it as `Arc<StakingLedger<G>>` between the UI and a
/// [`Poller`](crate::poller::Poller).
pub struct StakingLedger<G: StakingGateway + 'static> {
    gateway: Arc<G>,
    config: LedgerConfig,
    cache: Cache,
    rates: Mutex<Option<RewardRateConfig>>,
}

impl<G: StakingGateway + 'static> StakingLedger<G> {
    /// # Errors
    /// `ConfigError::Invalid` when `config` fails [`LedgerConfig::validate`].
    pub fn new(gateway: Arc<G>, config: LedgerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            gateway,
            config,
            cache: Arc::new(Mutex::new(IndexMap::new())),
            rates: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Start caching `account`; it is read on the next refresh.
    pub fn track(&self, account: Pubkey) {
        lock(&self.cache)
            .entry(account)
            .or_insert_with(|| CacheEntry::unread(account));
    }

    /// Tracked accounts, in the order they were first seen.
    pub fn tracked_accounts(&self) -> Vec<Pubkey> {
        lock(&self.cache).keys().copied().collect()
    }

    pub fn cached_position(&self, account: &Pubkey) -> Option<StakingPosition> {
        lock(&self.cache).get(account).map(|entry| entry.position)
    }

    pub fn sync_state(&self, account: &Pubkey) -> Option<SyncState> {
        lock(&self.cache).get(account).map(|entry| entry.sync)
    }

    pub fn reward_config(&self) -> Option<RewardRateConfig> {
        *lock(&self.rates)
    }

    /// Re-read the emission rate.
    pub async fn refresh_rate(&self) -> Result<RewardRateConfig, LedgerError> {
        let rate_per_second = self.gateway.read_reward_rate().await?;
        let rates = RewardRateConfig {
            rate_per_second,
            min_lock_seconds: self.config.min_lock_seconds,
        };
        *lock(&self.rates) = Some(rates);
        Ok(rates)
    }

    async fn rates(&self) -> Result<RewardRateConfig, LedgerError> {
        match self.reward_config() {
            Some(rates) => Ok(rates),
            None => self.refresh_rate().await,
        }
    }

    /// Re-read one account's position and replace the cached copy.
    ///
    /// Allowed while a command is in flight; the sync state is preserved.
    pub async fn refresh(&self, account: &Pubkey) -> Result<StakingPosition, LedgerError> {
        let snapshot = self.gateway.read_position(account).await?;
        let mut entries = lock(&self.cache);
        let entry = entries
            .entry(*account)
            .or_insert_with(|| CacheEntry::unread(*account));
        entry.apply_snapshot(*account, snapshot, self.config.min_lock_seconds);
        debug!(
            "refreshed {}: staked {}, earned {} at {}",
            account,
            entry.position.staked_amount,
            entry.position.accrued_reward,
            snapshot.observed_at
        );
        Ok(entry.position)
    }

    /// Refresh `account` and clear an `Unconfirmed` state.
    pub async fn resync(&self, account: &Pubkey) -> Result<StakingPosition, LedgerError> {
        let position = self.refresh(account).await?;
        if let Some(entry) = lock(&self.cache).get_mut(account) {
            if matches!(entry.sync, SyncState::Unconfirmed(_)) {
                info!("resynced {} after unconfirmed transaction", account);
                entry.sync = SyncState::Synced;
            }
        }
        Ok(position)
    }

    /// Display figures for `account` at `now`, without network calls.
    pub fn display_state(&self, account: &Pubkey, now: UnixTimestamp) -> DisplayState {
        let entry = lock(&self.cache).get(account).cloned();
        let Some(entry) = entry else {
            return DisplayState {
                staked_amount: TokenAmount::ZERO,
                live_earned: TokenAmount::ZERO,
                lock_status: LockStatus::Idle,
                pending_operation: None,
                unconfirmed: false,
                contract_can_withdraw: false,
            };
        };

        let position = entry.position;
        let live_earned = match self.reward_config() {
            Some(rates) => {
                let as_of = now.max(position.last_accrual_time);
                accrue(&position, rates.rate_per_second, as_of)
                    .map(|accrued| accrued.accrued_reward)
                    .unwrap_or(position.accrued_reward)
            }
            None => position.accrued_reward,
        };
        let (pending_operation, unconfirmed) = match entry.sync {
            SyncState::Synced => (None, false),
            SyncState::Pending(operation) => (Some(operation), false),
            SyncState::Unconfirmed(operation) => (Some(operation), true),
        };

        DisplayState {
            staked_amount: position.staked_amount,
            live_earned,
            lock_status: lock_status(&position, self.config.min_lock_seconds, now),
            pending_operation,
            unconfirmed,
            contract_can_withdraw: entry.remote_can_withdraw,
        }
    }

    pub async fn pool_stats(&self) -> Result<PoolStats, LedgerError> {
        let total_staked = self.gateway.read_total_staked().await?;
        let rates = self.refresh_rate().await?;
        Ok(PoolStats {
            total_staked,
            rate_per_second: rates.rate_per_second,
        })
    }

    pub async fn wallet_balances(&self, account: &Pubkey) -> Result<TokenBalances, LedgerError> {
        Ok(self.gateway.read_token_balances(account).await?)
    }

    /// Stake `amount`, approving the contract first if the allowance is short.
    pub async fn stake(
        &self,
        account: &Pubkey,
        amount: TokenAmount,
        now: UnixTimestamp,
    ) -> Result<StakingPosition, LedgerError> {
        self.execute(*account, Command::Stake(amount), now)
            .await
            .map(|outcome| outcome.position)
    }

    pub async fn withdraw(
        &self,
        account: &Pubkey,
        amount: TokenAmount,
        now: UnixTimestamp,
    ) -> Result<StakingPosition, LedgerError> {
        self.execute(*account, Command::Withdraw(amount), now)
            .await
            .map(|outcome| outcome.position)
    }

    /// Claim all accrued rewards; returns the claimed amount.
    pub async fn claim(
        &self,
        account: &Pubkey,
        now: UnixTimestamp,
    ) -> Result<TokenAmount, LedgerError> {
        self.execute(*account, Command::Claim, now)
            .await
            .map(|outcome| outcome.claimed)
    }

    /// Withdraw everything and claim in one transaction.
    pub async fn exit(
        &self,
        account: &Pubkey,
        now: UnixTimestamp,
    ) -> Result<ExitOutcome, LedgerError> {
        self.execute(*account, Command::Exit, now).await
    }

    async fn execute(
        &self,
        account: Pubkey,
        command: Command,
        now: UnixTimestamp,
    ) -> Result<ExitOutcome, LedgerError> {
        let operation = command.operation();
        let _pending = PendingGuard::acquire(&self.cache, account, operation)?;

        let base = self.validated_base(&account).await?;
        let rates = self.rates().await?;
        // A local clock behind the last chain read plans at chain time
        let as_of = now.max(base.last_accrual_time);
        let mut planned = command.plan(&base, &rates, as_of)?;

        if let Command::Stake(amount) = command {
            self.ensure_allowance(&account, amount).await?;
        }

        info!("submitting {} for {}", operation, account);
        let handle = match self.submit(&account, command).await {
            Ok(handle) => handle,
            Err(GatewayError::Rejected { reason }) => {
                return self.reconcile_rejection(&account, operation, &base, reason).await;
            }
            Err(err) => return Err(err.into()),
        };

        match self.confirm(&handle).await {
            Some(TxOutcome::Confirmed) => {
                info!("{} for {} confirmed in {}", operation, account, handle);
                self.commit(&account, planned.position);
                match self.refresh(&account).await {
                    Ok(position) => planned.position = position,
                    Err(err) => warn!(
                        "post-confirmation refresh for {} failed, keeping projected position: {}",
                        account, err
                    ),
                }
                Ok(planned)
            }
            Some(TxOutcome::Reverted { reason }) => {
                self.reconcile_rejection(&account, operation, &base, reason).await
            }
            None => {
                warn!(
                    "{} for {} not confirmed within {:?}, outcome unknown",
                    operation,
                    account,
                    self.config.confirmation_timeout()
                );
                self.set_sync(&account, SyncState::Unconfirmed(operation));
                self.watch_late_confirmation(account, operation, handle.clone());
                Err(LedgerError::Unconfirmed { handle })
            }
        }
    }

    /// Cached position for validation, re-read first when missing or stale.
    async fn validated_base(&self, account: &Pubkey) -> Result<StakingPosition, LedgerError> {
        let cached = lock(&self.cache)
            .get(account)
            .filter(|entry| !entry.stale)
            .map(|entry| entry.position);
        match cached {
            Some(position) => Ok(position),
            None => self.refresh(account).await,
        }
    }

    async fn ensure_allowance(
        &self,
        account: &Pubkey,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        let allowance = self.gateway.read_allowance(account).await?;
        if allowance >= amount {
            return Ok(());
        }

        info!("approving {} for {} (allowance {})", amount, account, allowance);
        let handle = self.gateway.submit_approve(account, amount).await?;
        match self.confirm(&handle).await {
            Some(TxOutcome::Confirmed) => Ok(()),
            Some(TxOutcome::Reverted { reason }) => {
                warn!("approval for {} reverted: {:?}", account, reason);
                Err(LedgerError::Rejected { reason })
            }
            None => Err(LedgerError::Unconfirmed { handle }),
        }
    }

    async fn submit(
        &self,
        account: &Pubkey,
        command: Command,
    ) -> Result<TransactionHandle, GatewayError> {
        match command {
            Command::Stake(amount) => self.gateway.submit_stake(account, amount).await,
            Command::Withdraw(amount) => self.gateway.submit_withdraw(account, amount).await,
            Command::Claim => self.gateway.submit_claim(account).await,
            Command::Exit => self.gateway.submit_exit(account).await,
        }
    }

    /// Wait for `handle` to settle; `None` when the outcome is unknown.
    async fn confirm(&self, handle: &TransactionHandle) -> Option<TxOutcome> {
        let confirmation = self.gateway.await_confirmation(handle);
        match timeout(self.config.confirmation_timeout(), confirmation).await {
            Ok(Ok(outcome)) => Some(outcome),
            Ok(Err(err)) => {
                warn!("lost track of {}: {}", handle, err);
                None
            }
            Err(_elapsed) => None,
        }
    }

    async fn reconcile_rejection(
        &self,
        account: &Pubkey,
        operation: Operation,
        base: &StakingPosition,
        reason: Option<String>,
    ) -> Result<ExitOutcome, LedgerError> {
        warn!("{} for {} rejected: {:?}", operation, account, reason);
        self.mark_stale(account);

        match self.refresh(account).await {
            Ok(latest)
                if latest.staked_amount != base.staked_amount
                    || latest.stake_start_time != base.stake_start_time =>
            {
                warn!("{} changed remotely since it was validated", account);
                Err(LedgerError::StaleRead)
            }
            Ok(_) => Err(LedgerError::Rejected { reason }),
            Err(err) => {
                warn!("refresh after rejection for {} failed: {}", account, err);
                Err(LedgerError::Rejected { reason })
            }
        }
    }

    fn commit(&self, account: &Pubkey, position: StakingPosition) {
        if let Some(entry) = lock(&self.cache).get_mut(account) {
            entry.position = position;
            entry.stale = true;
        }
    }

    fn mark_stale(&self, account: &Pubkey) {
        if let Some(entry) = lock(&self.cache).get_mut(account) {
            entry.stale = true;
        }
    }

    fn set_sync(&self, account: &Pubkey, sync: SyncState) {
        if let Some(entry) = lock(&self.cache).get_mut(account) {
            entry.sync = sync;
        }
    }

    /// Keep waiting on a timed-out transaction and apply whatever it did.
    fn watch_late_confirmation(
        &self,
        account: Pubkey,
        operation: Operation,
        handle: TransactionHandle,
    ) {
        let gateway = Arc::clone(&self.gateway);
        let cache = Arc::clone(&self.cache);
        let min_lock_seconds = self.config.min_lock_seconds;

        tokio::spawn(async move {
            match gateway.await_confirmation(&handle).await {
                Ok(outcome) => info!("late outcome for {} ({}): {:?}", handle, operation, outcome),
                Err(err) => warn!("gave up waiting on {} ({}): {}", handle, operation, err),
            }
            match gateway.read_position(&account).await {
                Ok(snapshot) => {
                    let mut entries = lock(&cache);
                    if let Some(entry) = entries.get_mut(&account) {
                        entry.apply_snapshot(account, snapshot, min_lock_seconds);
                        if entry.sync == SyncState::Unconfirmed(operation) {
                            entry.sync = SyncState::Synced;
                        }
                    }
                }
                Err(err) => warn!("{} stays unconfirmed until resync: {}", account, err),
            }
        });
    }
}
