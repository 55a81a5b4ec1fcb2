//! Withdrawal eligibility.
//!
//! A position may be withdrawn once it has aged `min_lock_seconds` since its
//! stake start time. Eligibility is always derived, never stored.

use anchor_lang::solana_program::clock::UnixTimestamp;

use crate::state::StakingPosition;

/// Lock state of a position at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStatus {
    /// Nothing staked. Distinct from a zero countdown.
    Idle,
    /// Staked and still locked for this many seconds.
    Locked { remaining_seconds: i64 },
    Unlocked,
}

/// Whether `position` may be withdrawn at `now`.
///
/// An idle position is never withdrawable.
pub fn can_withdraw(position: &StakingPosition, min_lock_seconds: i64, now: UnixTimestamp) -> bool {
    !position.staked_amount.is_zero() && position.is_lock_ended(now, min_lock_seconds)
}

/// Seconds until the lock ends, clamped to zero, or `None` when not staking.
///
/// Display only; [`can_withdraw`] is the authoritative check.
pub fn remaining_lock(
    position: &StakingPosition,
    min_lock_seconds: i64,
    now: UnixTimestamp,
) -> Option<i64> {
    if position.staked_amount.is_zero() {
        return None;
    }
    let start = position.stake_start_time?;
    let unlock_at = start.saturating_add(min_lock_seconds);
    Some(unlock_at.saturating_sub(now).max(0))
}

pub fn lock_status(
    position: &StakingPosition,
    min_lock_seconds: i64,
    now: UnixTimestamp,
) -> LockStatus {
    if can_withdraw(position, min_lock_seconds, now) {
        return LockStatus::Unlocked;
    }
    match remaining_lock(position, min_lock_seconds, now) {
        None => LockStatus::Idle,
        Some(remaining_seconds) => LockStatus::Locked { remaining_seconds },
    }
}
