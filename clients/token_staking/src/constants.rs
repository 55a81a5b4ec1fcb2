//! Constants shared by the staking client.
//!
//! This module defines the values mirrored from the deployed staking contract
//! (lock period, default emission rate, token precision) and the client's
//! refresh cadence.

use anchor_lang::solana_program::clock::UnixTimestamp;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Number of seconds in an hour
pub const SECONDS_PER_HOUR: i64 = 3_600;

/// Number of seconds in a minute
pub const SECONDS_PER_MINUTE: i64 = 60;

/// Minimum age of a stake before it may be withdrawn (7 days)
pub const MIN_LOCK_SECONDS: i64 = 7 * SECONDS_PER_DAY;

/// Contract's default emission rate, in smallest token units per second
pub const DEFAULT_REWARD_RATE: u128 = 100;

/// Fractional digits of the staking and reward tokens
pub const TOKEN_DECIMALS: u8 = 18;

/// Smallest units in one whole token (10^18)
pub const UNITS_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

/// Interval between position refreshes, in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;

/// How long a submitted transaction may go unconfirmed before the outcome is
/// treated as unknown, in milliseconds
pub const DEFAULT_CONFIRMATION_TIMEOUT_MS: u64 = 60_000;

/// Discriminator byte at the start of encoded position snapshots
pub const POSITION_SNAPSHOT_DISCRIMINATOR: u8 = 1;

/// Stake start time recorded for an idle position
pub const UNSET_TIMESTAMP: UnixTimestamp = 0;
