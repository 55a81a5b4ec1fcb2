//! Fixed-point token quantities.
//!
//! Every quantity mirrored from the contract is held as a count of the
//! token's smallest unit, so client arithmetic matches on-chain arithmetic
//! exactly.

use std::fmt;
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::{TOKEN_DECIMALS, UNITS_PER_TOKEN};
use crate::error::StakingError;

/// A non-negative token quantity with 18 fractional digits.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount(0);

    /// Wraps a raw count of smallest units.
    pub const fn from_units(units: u128) -> Self {
        TokenAmount(units)
    }

    /// Whole tokens, scaled by 10^18.
    pub fn from_tokens(tokens: u64) -> Option<Self> {
        (tokens as u128).checked_mul(UNITS_PER_TOKEN).map(TokenAmount)
    }

    pub const fn units(self) -> u128 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_add(other.0).map(TokenAmount)
    }

    pub fn checked_sub(self, other: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_sub(other.0).map(TokenAmount)
    }

    /// Multiplies by a plain count (e.g. elapsed seconds).
    pub fn checked_mul_count(self, count: u64) -> Option<TokenAmount> {
        self.0.checked_mul(count as u128).map(TokenAmount)
    }

    /// Lossy conversion to whole tokens, for decorative analytics only.
    pub fn to_tokens_f64(self) -> f64 {
        let whole = self.0 / UNITS_PER_TOKEN;
        let frac = self.0 % UNITS_PER_TOKEN;
        whole as f64 + frac as f64 / UNITS_PER_TOKEN as f64
    }
}

impl fmt::Display for TokenAmount {
    /// Exact decimal rendering with trailing zeros trimmed (`1.5`, `100`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNITS_PER_TOKEN;
        let frac = self.0 % UNITS_PER_TOKEN;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{:0width$}", frac, width = TOKEN_DECIMALS as usize);
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for TokenAmount {
    type Err = StakingError;

    /// Parses a decimal token string such as `"100"` or `"0.25"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(StakingError::InvalidAmount);
        }
        if frac.len() > TOKEN_DECIMALS as usize {
            return Err(StakingError::InvalidAmount);
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !all_digits(frac) {
            return Err(StakingError::InvalidAmount);
        }

        let whole_units = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .map_err(|_| StakingError::MathOverflow)?
                .checked_mul(UNITS_PER_TOKEN)
                .ok_or(StakingError::MathOverflow)?
        };
        let frac_units = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = TOKEN_DECIMALS as usize);
            padded
                .parse::<u128>()
                .map_err(|_| StakingError::InvalidAmount)?
        };

        whole_units
            .checked_add(frac_units)
            .map(TokenAmount)
            .ok_or(StakingError::MathOverflow)
    }
}
