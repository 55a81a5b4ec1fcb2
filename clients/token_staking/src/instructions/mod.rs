//! Position transitions for the staking client.
//!
//! Each transition validates its preconditions against a position, accrues
//! rewards up to `now`, and returns the updated copy. A rejected transition
//! leaves the caller's position untouched.

use std::fmt;

pub mod claim;
pub mod exit;
pub mod stake;
pub mod withdraw;

pub use claim::*;
pub use exit::*;
pub use stake::*;
pub use withdraw::*;

/// Mutating commands a client can issue against a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Stake,
    Withdraw,
    Claim,
    Exit,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Stake => "stake",
            Operation::Withdraw => "withdraw",
            Operation::Claim => "claim",
            Operation::Exit => "exit",
        };
        f.write_str(name)
    }
}
