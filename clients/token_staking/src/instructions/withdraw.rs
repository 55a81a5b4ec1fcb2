//! Withdraw transition.

use anchor_lang::solana_program::clock::UnixTimestamp;
use log::debug;

use crate::accrual::accrue;
use crate::amount::TokenAmount;
use crate::eligibility::can_withdraw;
use crate::error::StakingError;
use crate::state::StakingPosition;

/// Remove `amount` from the position's stake.
///
/// Fully withdrawing clears `stake_start_time`, so the next stake starts a
/// fresh lock.
///
/// # Errors
/// * `ZeroAmount` if `amount` is zero
/// * `NoActiveStake` if nothing is staked
/// * `InsufficientStakedBalance` if `amount` exceeds the stake
/// * `LockPeriodNotEnded` if the position is still locked
pub fn withdraw(
    position: &StakingPosition,
    amount: TokenAmount,
    rate_per_second: TokenAmount,
    min_lock_seconds: i64,
    now: UnixTimestamp,
) -> Result<StakingPosition, StakingError> {
    if amount.is_zero() {
        return Err(StakingError::ZeroAmount);
    }
    if position.is_idle() {
        return Err(StakingError::NoActiveStake);
    }
    if amount > position.staked_amount {
        return Err(StakingError::InsufficientStakedBalance);
    }
    if !can_withdraw(position, min_lock_seconds, now) {
        return Err(StakingError::LockPeriodNotEnded);
    }

    let mut updated = accrue(position, rate_per_second, now)?;
    updated.staked_amount = updated
        .staked_amount
        .checked_sub(amount)
        .ok_or(StakingError::InsufficientStakedBalance)?;

    // Fully unstaked, the lock clock resets
    if updated.staked_amount.is_zero() {
        updated.stake_start_time = None;
    }

    debug!(
        "withdraw {} for {}: remaining {}, pending rewards {}",
        amount, updated.account, updated.staked_amount, updated.accrued_reward
    );

    Ok(updated)
}
