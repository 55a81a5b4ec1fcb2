//! In-memory stand-in for the deployed staking contract.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use anchor_lang::prelude::Pubkey;
use async_trait::async_trait;
use tokio::sync::Notify;
use token_staking::{
    GatewayError, PositionSnapshot, StakingGateway, TokenAmount, TokenBalances, TransactionHandle,
    TxOutcome,
};

pub const RATE: u128 = 100;
pub const WEEK: i64 = 7 * 86_400;
/// Contract clock at construction.
pub const T0: i64 = 1_700_000_000;

/// How `await_confirmation` behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmMode {
    /// Settle as soon as confirmation is awaited.
    Immediate,
    /// Settle only after [`FakeContract::release`].
    Delayed,
}

#[derive(Debug, Clone, Copy)]
enum Call {
    Approve(u128),
    Stake(u128),
    Withdraw(u128),
    Claim,
    Exit,
}

#[derive(Debug, Clone, Copy)]
struct QueuedTx {
    account: Pubkey,
    call: Call,
}

#[derive(Debug, Default, Clone, Copy)]
struct Onchain {
    staked: u128,
    rewards: u128,
    start: i64,
    last_update: i64,
}

#[derive(Debug)]
struct ContractState {
    now: i64,
    rate: u128,
    positions: HashMap<Pubkey, Onchain>,
    allowances: HashMap<Pubkey, u128>,
    wallet: HashMap<Pubkey, u128>,
    reward_wallet: HashMap<Pubkey, u128>,
    queued: HashMap<String, QueuedTx>,
    settled: HashMap<String, TxOutcome>,
    next_tx: u64,
    mode: ConfirmMode,
    revert_next: Option<Option<String>>,
    reject_next_submit: Option<Option<String>>,
    fail_reads: bool,
    submissions: Vec<&'static str>,
    position_reads: usize,
}

pub struct FakeContract {
    state: Mutex<ContractState>,
    release: Notify,
}

impl Default for FakeContract {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeContract {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ContractState {
                now: T0,
                rate: RATE,
                positions: HashMap::new(),
                allowances: HashMap::new(),
                wallet: HashMap::new(),
                reward_wallet: HashMap::new(),
                queued: HashMap::new(),
                settled: HashMap::new(),
                next_tx: 0,
                mode: ConfirmMode::Immediate,
                revert_next: None,
                reject_next_submit: None,
                fail_reads: false,
                submissions: Vec::new(),
                position_reads: 0,
            }),
            release: Notify::new(),
        }
    }

    pub fn set_time(&self, now: i64) {
        self.state.lock().unwrap().now = now;
    }

    pub fn set_mode(&self, mode: ConfirmMode) {
        self.state.lock().unwrap().mode = mode;
    }

    pub fn fund_wallet(&self, account: Pubkey, amount: u128) {
        *self.state.lock().unwrap().wallet.entry(account).or_default() += amount;
    }

    pub fn set_allowance(&self, account: Pubkey, amount: u128) {
        self.state.lock().unwrap().allowances.insert(account, amount);
    }

    /// The next settled transaction reverts with `reason`.
    pub fn revert_next(&self, reason: Option<&str>) {
        self.state.lock().unwrap().revert_next = Some(reason.map(str::to_string));
    }

    /// The next submission is refused before it is queued.
    pub fn reject_next_submit(&self, reason: Option<&str>) {
        self.state.lock().unwrap().reject_next_submit = Some(reason.map(str::to_string));
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    /// Settle one delayed confirmation.
    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn submissions(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn position_reads(&self) -> usize {
        self.state.lock().unwrap().position_reads
    }

    pub fn reward_balance(&self, account: &Pubkey) -> u128 {
        self.state
            .lock()
            .unwrap()
            .reward_wallet
            .get(account)
            .copied()
            .unwrap_or(0)
    }

    /// A withdrawal of everything made from another client.
    pub fn withdraw_elsewhere(&self, account: &Pubkey) {
        let mut state = self.state.lock().unwrap();
        let now = state.now;
        let rate = state.rate;
        let position = state.positions.entry(*account).or_default();
        update_reward(position, rate, now);
        let staked = position.staked;
        position.staked = 0;
        position.start = 0;
        *state.wallet.entry(*account).or_default() += staked;
    }

    fn queue(
        &self,
        account: &Pubkey,
        call: Call,
        name: &'static str,
    ) -> Result<TransactionHandle, GatewayError> {
        let mut state = self.state.lock().unwrap();
        if let Some(reason) = state.reject_next_submit.take() {
            return Err(GatewayError::Rejected { reason });
        }
        state.next_tx += 1;
        let handle = format!("tx-{}", state.next_tx);
        state.queued.insert(handle.clone(), QueuedTx { account: *account, call });
        state.submissions.push(name);
        Ok(TransactionHandle(handle))
    }

    fn settle(&self, handle: &TransactionHandle) -> Result<TxOutcome, GatewayError> {
        let mut state = self.state.lock().unwrap();
        if let Some(outcome) = state.settled.get(&handle.0) {
            return Ok(outcome.clone());
        }
        let tx = state
            .queued
            .remove(&handle.0)
            .ok_or_else(|| GatewayError::Transport(format!("unknown transaction {handle}")))?;
        let outcome = match state.revert_next.take() {
            Some(reason) => TxOutcome::Reverted { reason },
            None => match execute(&mut state, tx) {
                Ok(()) => TxOutcome::Confirmed,
                Err(reason) => TxOutcome::Reverted {
                    reason: Some(reason.to_string()),
                },
            },
        };
        state.settled.insert(handle.0.clone(), outcome.clone());
        Ok(outcome)
    }
}

fn update_reward(position: &mut Onchain, rate: u128, now: i64) {
    if position.staked > 0 {
        position.rewards += rate * (now - position.last_update) as u128;
    }
    position.last_update = now;
}

fn withdraw(position: &mut Onchain, amount: u128, now: i64) -> Result<(), &'static str> {
    if amount == 0 {
        return Err("Cannot withdraw 0 tokens");
    }
    if position.staked < amount {
        return Err("Insufficient staked balance");
    }
    if now - position.start < WEEK {
        return Err("Minimum staking period not met");
    }
    position.staked -= amount;
    if position.staked == 0 {
        position.start = 0;
    }
    Ok(())
}

fn execute(state: &mut ContractState, tx: QueuedTx) -> Result<(), &'static str> {
    let now = state.now;
    let rate = state.rate;
    let account = tx.account;

    if let Call::Approve(amount) = tx.call {
        state.allowances.insert(account, amount);
        return Ok(());
    }

    let mut position = state.positions.get(&account).copied().unwrap_or_default();
    update_reward(&mut position, rate, now);

    match tx.call {
        Call::Approve(_) => unreachable!(),
        Call::Stake(amount) => {
            if amount == 0 {
                return Err("Cannot stake 0 tokens");
            }
            let allowance = state.allowances.get(&account).copied().unwrap_or(0);
            if allowance < amount {
                return Err("ERC20: insufficient allowance");
            }
            let balance = state.wallet.get(&account).copied().unwrap_or(0);
            if balance < amount {
                return Err("ERC20: transfer amount exceeds balance");
            }
            state.allowances.insert(account, allowance - amount);
            state.wallet.insert(account, balance - amount);
            if position.staked == 0 {
                position.start = now;
            }
            position.staked += amount;
        }
        Call::Withdraw(amount) => {
            withdraw(&mut position, amount, now)?;
            *state.wallet.entry(account).or_default() += amount;
        }
        Call::Claim => {
            if position.rewards == 0 {
                return Err("No rewards to claim");
            }
            *state.reward_wallet.entry(account).or_default() += position.rewards;
            position.rewards = 0;
        }
        Call::Exit => {
            let staked = position.staked;
            withdraw(&mut position, staked, now)?;
            *state.wallet.entry(account).or_default() += staked;
            *state.reward_wallet.entry(account).or_default() += position.rewards;
            position.rewards = 0;
        }
    }

    state.positions.insert(account, position);
    Ok(())
}

#[async_trait]
impl StakingGateway for FakeContract {
    async fn read_position(&self, account: &Pubkey) -> Result<PositionSnapshot, GatewayError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(GatewayError::Transport("rpc unavailable".into()));
        }
        state.position_reads += 1;
        let now = state.now;
        let mut position = state.positions.get(account).copied().unwrap_or_default();
        update_reward(&mut position, state.rate, now);
        Ok(PositionSnapshot {
            staked_amount: TokenAmount::from_units(position.staked),
            earned: TokenAmount::from_units(position.rewards),
            stake_start_time: position.start,
            can_withdraw: position.staked > 0 && now - position.start >= WEEK,
            observed_at: now,
        })
    }

    async fn read_reward_rate(&self) -> Result<TokenAmount, GatewayError> {
        Ok(TokenAmount::from_units(self.state.lock().unwrap().rate))
    }

    async fn read_total_staked(&self) -> Result<TokenAmount, GatewayError> {
        let state = self.state.lock().unwrap();
        Ok(TokenAmount::from_units(
            state.positions.values().map(|position| position.staked).sum(),
        ))
    }

    async fn read_allowance(&self, account: &Pubkey) -> Result<TokenAmount, GatewayError> {
        let state = self.state.lock().unwrap();
        Ok(TokenAmount::from_units(
            state.allowances.get(account).copied().unwrap_or(0),
        ))
    }

    async fn read_token_balances(&self, account: &Pubkey) -> Result<TokenBalances, GatewayError> {
        let state = self.state.lock().unwrap();
        Ok(TokenBalances {
            staking: TokenAmount::from_units(state.wallet.get(account).copied().unwrap_or(0)),
            reward: TokenAmount::from_units(state.reward_wallet.get(account).copied().unwrap_or(0)),
        })
    }

    async fn submit_approve(
        &self,
        account: &Pubkey,
        amount: TokenAmount,
    ) -> Result<TransactionHandle, GatewayError> {
        self.queue(account, Call::Approve(amount.units()), "approve")
    }

    async fn submit_stake(
        &self,
        account: &Pubkey,
        amount: TokenAmount,
    ) -> Result<TransactionHandle, GatewayError> {
        self.queue(account, Call::Stake(amount.units()), "stake")
    }

    async fn submit_withdraw(
        &self,
        account: &Pubkey,
        amount: TokenAmount,
    ) -> Result<TransactionHandle, GatewayError> {
        self.queue(account, Call::Withdraw(amount.units()), "withdraw")
    }

    async fn submit_claim(&self, account: &Pubkey) -> Result<TransactionHandle, GatewayError> {
        self.queue(account, Call::Claim, "claim")
    }

    async fn submit_exit(&self, account: &Pubkey) -> Result<TransactionHandle, GatewayError> {
        self.queue(account, Call::Exit, "exit")
    }

    async fn await_confirmation(
        &self,
        handle: &TransactionHandle,
    ) -> Result<TxOutcome, GatewayError> {
        let mode = self.state.lock().unwrap().mode;
        if mode == ConfirmMode::Delayed {
            self.release.notified().await;
        }
        self.settle(handle)
    }
}
