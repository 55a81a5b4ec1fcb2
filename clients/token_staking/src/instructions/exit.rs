//! Exit transition: withdraw everything and claim in one step.

use anchor_lang::solana_program::clock::UnixTimestamp;
use log::debug;

use crate::amount::TokenAmount;
use crate::error::StakingError;
use crate::instructions::withdraw;
use crate::state::StakingPosition;

/// Result of a successful [`exit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    pub withdrawn: TokenAmount,
    pub claimed: TokenAmount,
    pub position: StakingPosition,
}

/// Withdraw the whole stake and claim all rewards.
///
/// Either both halves apply or neither does. Zero accrued reward does not
/// fail the exit; only the withdraw preconditions can.
///
/// # Errors
/// * `NoActiveStake` if nothing is staked
/// * `LockPeriodNotEnded` if the position is still locked
pub fn exit(
    position: &StakingPosition,
    rate_per_second: TokenAmount,
    min_lock_seconds: i64,
    now: UnixTimestamp,
) -> Result<ExitOutcome, StakingError> {
    if position.is_idle() {
        return Err(StakingError::NoActiveStake);
    }

    let withdrawn = position.staked_amount;
    let mut updated = withdraw(position, withdrawn, rate_per_second, min_lock_seconds, now)?;

    let claimed = updated.accrued_reward;
    updated.accrued_reward = TokenAmount::ZERO;

    debug!(
        "exit for {}: withdrew {}, claimed {}",
        updated.account, withdrawn, claimed
    );

    Ok(ExitOutcome {
        withdrawn,
        claimed,
        position: updated,
    })
}
