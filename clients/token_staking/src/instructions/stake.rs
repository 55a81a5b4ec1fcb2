//! Stake transition.

use anchor_lang::solana_program::clock::UnixTimestamp;
use log::debug;

use crate::accrual::accrue;
use crate::amount::TokenAmount;
use crate::error::StakingError;
use crate::state::StakingPosition;

/// Add `amount` to the position's stake.
///
/// The lock clock starts only when the balance goes from zero to non-zero;
/// top-ups leave `stake_start_time` where it was.
///
/// # Arguments
/// * `position` - Current position
/// * `amount` - Amount of tokens to stake
/// * `rate_per_second` - Emission rate used to accrue up to `now` first
/// * `now` - Current Unix timestamp
///
/// # Errors
/// * `ZeroAmount` if `amount` is zero
/// * `MathOverflow` if the new balance does not fit
pub fn stake(
    position: &StakingPosition,
    amount: TokenAmount,
    rate_per_second: TokenAmount,
    now: UnixTimestamp,
) -> Result<StakingPosition, StakingError> {
    if amount.is_zero() {
        return Err(StakingError::ZeroAmount);
    }

    let was_idle = position.is_idle();
    let mut updated = accrue(position, rate_per_second, now)?;

    if was_idle {
        updated.stake_start_time = Some(now);
    }
    updated.staked_amount = updated
        .staked_amount
        .checked_add(amount)
        .ok_or(StakingError::MathOverflow)?;

    debug!(
        "stake {} for {}: balance {}, lock started at {:?}",
        amount, updated.account, updated.staked_amount, updated.stake_start_time
    );

    Ok(updated)
}
