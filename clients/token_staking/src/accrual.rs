//! Reward accrual.
//!
//! Rewards accrue linearly at the contract's flat emission rate:
//! `reward = rate_per_second * (as_of - last_accrual_time)`, and only while
//! something is staked.

use anchor_lang::solana_program::clock::UnixTimestamp;

use crate::amount::TokenAmount;
use crate::error::StakingError;
use crate::state::StakingPosition;

/// Calculate rewards earned since `position.last_accrual_time`.
///
/// # Arguments
/// * `position` - The position to evaluate
/// * `rate_per_second` - Emission rate in smallest units per second
/// * `as_of` - Time to accrue up to; must not precede `last_accrual_time`
///
/// # Returns
/// Newly accrued rewards (not including `position.accrued_reward`)
pub fn pending_rewards(
    position: &StakingPosition,
    rate_per_second: TokenAmount,
    as_of: UnixTimestamp,
) -> Result<TokenAmount, StakingError> {
    if as_of < position.last_accrual_time {
        return Err(StakingError::InvalidTimestamp);
    }
    if position.staked_amount.is_zero() {
        return Ok(TokenAmount::ZERO);
    }

    let elapsed = as_of
        .checked_sub(position.last_accrual_time)
        .and_then(|secs| u64::try_from(secs).ok())
        .ok_or(StakingError::MathOverflow)?;

    rate_per_second
        .checked_mul_count(elapsed)
        .ok_or(StakingError::MathOverflow)
}

/// Bring `accrued_reward` up to date as of `as_of`.
///
/// Pure: the input is untouched and the updated copy is returned.
pub fn accrue(
    position: &StakingPosition,
    rate_per_second: TokenAmount,
    as_of: UnixTimestamp,
) -> Result<StakingPosition, StakingError> {
    let delta = pending_rewards(position, rate_per_second, as_of)?;

    let mut updated = *position;
    updated.accrued_reward = position
        .accrued_reward
        .checked_add(delta)
        .ok_or(StakingError::MathOverflow)?;
    updated.last_accrual_time = as_of;

    Ok(updated)
}
