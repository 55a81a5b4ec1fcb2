//! Presentation helpers.
//!
//! Nothing here feeds back into position logic. The `f64` projections are
//! decorative.

use crate::amount::TokenAmount;
use crate::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};
use crate::eligibility::LockStatus;

/// Projected reward for a stake at a given APY.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarningsProjection {
    pub daily: f64,
    pub monthly: f64,
}

/// Compact amount for dashboards: `0`, `< 0.001`, four decimals below one
/// token, otherwise at most two decimals with thousands separators.
pub fn format_token_amount(amount: TokenAmount) -> String {
    let tokens = amount.to_tokens_f64();
    if amount.is_zero() {
        return "0".to_string();
    }
    if tokens < 0.001 {
        return "< 0.001".to_string();
    }
    // Decide on the rounded value; the four-decimal form never reads 1.0000
    if (tokens * 10_000.0).round() < 10_000.0 {
        return format!("{tokens:.4}");
    }
    group_thousands(&format!("{tokens:.2}"))
}

fn group_thousands(fixed: &str) -> String {
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed, ""));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        grouped
    } else {
        format!("{grouped}.{frac}")
    }
}

pub fn format_lock_status(status: LockStatus) -> String {
    match status {
        LockStatus::Idle => "Not staking".to_string(),
        LockStatus::Unlocked => "Can withdraw".to_string(),
        LockStatus::Locked { remaining_seconds } => {
            let days = remaining_seconds / SECONDS_PER_DAY;
            let hours = (remaining_seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
            let minutes = (remaining_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
            format!("{days}d {hours}h {minutes}m remaining")
        }
    }
}

pub fn projected_earnings(amount: TokenAmount, apy_percent: f64) -> EarningsProjection {
    let tokens = amount.to_tokens_f64();
    EarningsProjection {
        daily: tokens * apy_percent / 365.0 / 100.0,
        monthly: tokens * apy_percent / 12.0 / 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> TokenAmount {
        s.parse().unwrap()
    }

    #[test]
    fn formats_amounts_by_magnitude() {
        assert_eq!(format_token_amount(TokenAmount::ZERO), "0");
        assert_eq!(format_token_amount(TokenAmount::from_units(6_000)), "< 0.001");
        assert_eq!(format_token_amount(tokens("0.5")), "0.5000");
        assert_eq!(format_token_amount(tokens("1234567.891")), "1,234,567.89");
        assert_eq!(format_token_amount(tokens("100")), "100");
        assert_eq!(format_token_amount(tokens("999.5")), "999.5");
    }

    #[test]
    fn just_under_one_token_rounds_up_to_grouped_form() {
        assert_eq!(format_token_amount(tokens("0.99996")), "1");
        assert_eq!(format_token_amount(tokens("0.99994")), "0.9999");
    }

    #[test]
    fn formats_lock_countdown() {
        assert_eq!(format_lock_status(LockStatus::Idle), "Not staking");
        assert_eq!(format_lock_status(LockStatus::Unlocked), "Can withdraw");
        let remaining_seconds =
            2 * SECONDS_PER_DAY + 3 * SECONDS_PER_HOUR + 4 * SECONDS_PER_MINUTE + 59;
        assert_eq!(
            format_lock_status(LockStatus::Locked { remaining_seconds }),
            "2d 3h 4m remaining"
        );
    }

    #[test]
    fn projects_simple_interest() {
        let projection = projected_earnings(tokens("365"), 10.0);
        assert!((projection.daily - 0.1).abs() < 1e-9);
        assert!((projection.monthly - 365.0 * 0.1 / 12.0).abs() < 1e-9);
    }
}
