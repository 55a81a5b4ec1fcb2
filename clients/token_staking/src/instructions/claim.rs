//! Claim transition.

use anchor_lang::solana_program::clock::UnixTimestamp;
use log::debug;

use crate::accrual::accrue;
use crate::amount::TokenAmount;
use crate::error::StakingError;
use crate::state::StakingPosition;

/// Pay out all accrued rewards without touching the stake.
///
/// # Returns
/// The claimed amount and the position with `accrued_reward` reset to zero
///
/// # Errors
/// * `NoRewardsAvailable` if nothing has accrued as of `now`
pub fn claim(
    position: &StakingPosition,
    rate_per_second: TokenAmount,
    now: UnixTimestamp,
) -> Result<(TokenAmount, StakingPosition), StakingError> {
    let mut updated = accrue(position, rate_per_second, now)?;

    let claimed = updated.accrued_reward;
    if claimed.is_zero() {
        return Err(StakingError::NoRewardsAvailable);
    }
    updated.accrued_reward = TokenAmount::ZERO;

    debug!("claim {} for {}", claimed, updated.account);

    Ok((claimed, updated))
}
