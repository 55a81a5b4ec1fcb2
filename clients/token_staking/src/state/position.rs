use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::clock::UnixTimestamp;

use crate::amount::TokenAmount;

/// One account's stake, as last known to the client.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StakingPosition {
    pub account: Pubkey,

    pub staked_amount: TokenAmount,
    pub accrued_reward: TokenAmount,

    /// Set when the balance goes from zero to non-zero, cleared when it returns to zero.
    pub stake_start_time: Option<UnixTimestamp>,
    pub last_accrual_time: UnixTimestamp,
}

impl StakingPosition {
    /// All-zero position for an account that has never staked.
    pub fn idle(account: Pubkey) -> Self {
        Self {
            account,
            ..Self::default()
        }
    }

    pub fn is_idle(&self) -> bool {
        self.staked_amount.is_zero()
    }

    pub fn is_lock_ended(&self, now: UnixTimestamp, lock_seconds: i64) -> bool {
        match self.stake_start_time {
            Some(start) => now.saturating_sub(start) >= lock_seconds,
            None => false,
        }
    }
}
