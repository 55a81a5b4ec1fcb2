//! Boundary to the remote staking contract.
//!
//! The contract is the source of truth. [`StakingGateway`] is what the
//! ledger needs from whatever client talks to it: authoritative reads,
//! transaction submission, and confirmation.

use std::fmt;

use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::clock::UnixTimestamp;
use async_trait::async_trait;
use borsh::{BorshDeserialize, BorshSerialize};

use crate::amount::TokenAmount;
use crate::constants::{POSITION_SNAPSHOT_DISCRIMINATOR, UNSET_TIMESTAMP};
use crate::error::GatewayError;
use crate::state::StakingPosition;

/// Opaque reference to a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionHandle(pub String);

impl fmt::Display for TransactionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Final state of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome {
    Confirmed,
    Reverted { reason: Option<String> },
}

/// Wallet balances of the staking and reward tokens.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TokenBalances {
    pub staking: TokenAmount,
    pub reward: TokenAmount,
}

/// Authoritative read of one account's position.
///
/// Serialised with Borsh behind a one-byte discriminator:
///   discriminator (1)
///   + staked_amount (16)
///   + earned (16)
///   + stake_start_time (8)
///   + can_withdraw (1)
///   + observed_at (8)
///   = 50 bytes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct PositionSnapshot {
    pub staked_amount: TokenAmount,

    /// Rewards accrued and unclaimed as of `observed_at`.
    pub earned: TokenAmount,

    /// Zero when nothing is staked.
    pub stake_start_time: UnixTimestamp,

    /// The contract's own eligibility answer at `observed_at`.
    pub can_withdraw: bool,

    /// Chain time the read was taken at.
    pub observed_at: UnixTimestamp,
}

impl PositionSnapshot {
    pub const SERIALIZED_SIZE: usize = 1 + 16 + 16 + 8 + 1 + 8;

    /// Decode raw account data (expects leading discriminator byte).
    pub fn try_from_account_data(data: &[u8]) -> Result<Self, GatewayError> {
        match data.split_first() {
            Some((&POSITION_SNAPSHOT_DISCRIMINATOR, mut payload)) => {
                Ok(<Self as BorshDeserialize>::deserialize(&mut payload)?)
            }
            _ => Err(GatewayError::InvalidAccountData(
                "missing or invalid position discriminator".to_string(),
            )),
        }
    }

    /// Encode into raw account data (prepends discriminator byte).
    pub fn to_account_data(&self) -> Result<Vec<u8>, GatewayError> {
        let mut data = Vec::with_capacity(Self::SERIALIZED_SIZE);
        data.push(POSITION_SNAPSHOT_DISCRIMINATOR);
        BorshSerialize::serialize(self, &mut data)?;
        Ok(data)
    }

    /// Client-side position equivalent to this read.
    pub fn into_position(self, account: Pubkey) -> StakingPosition {
        let unset = self.staked_amount.is_zero() || self.stake_start_time == UNSET_TIMESTAMP;
        let stake_start_time = if unset {
            None
        } else {
            Some(self.stake_start_time)
        };
        StakingPosition {
            account,
            staked_amount: self.staked_amount,
            accrued_reward: self.earned,
            stake_start_time,
            last_accrual_time: self.observed_at,
        }
    }
}

/// Client of the deployed staking contract.
///
/// Submissions return as soon as the transaction is accepted for
/// processing; [`await_confirmation`](Self::await_confirmation) reports how
/// it ended. A submitted transaction cannot be recalled.
#[async_trait]
pub trait StakingGateway: Send + Sync {
    async fn read_position(&self, account: &Pubkey) -> Result<PositionSnapshot, GatewayError>;

    /// Emission rate in smallest units per second.
    async fn read_reward_rate(&self) -> Result<TokenAmount, GatewayError>;

    async fn read_total_staked(&self) -> Result<TokenAmount, GatewayError>;

    /// How much of the staking token the contract may pull from `account`.
    async fn read_allowance(&self, account: &Pubkey) -> Result<TokenAmount, GatewayError>;

    async fn read_token_balances(&self, account: &Pubkey) -> Result<TokenBalances, GatewayError>;

    async fn submit_approve(
        &self,
        account: &Pubkey,
        amount: TokenAmount,
    ) -> Result<TransactionHandle, GatewayError>;

    async fn submit_stake(
        &self,
        account: &Pubkey,
        amount: TokenAmount,
    ) -> Result<TransactionHandle, GatewayError>;

    async fn submit_withdraw(
        &self,
        account: &Pubkey,
        amount: TokenAmount,
    ) -> Result<TransactionHandle, GatewayError>;

    async fn submit_claim(&self, account: &Pubkey) -> Result<TransactionHandle, GatewayError>;

    async fn submit_exit(&self, account: &Pubkey) -> Result<TransactionHandle, GatewayError>;

    async fn await_confirmation(
        &self,
        handle: &TransactionHandle,
    ) -> Result<TxOutcome, GatewayError>;
}
