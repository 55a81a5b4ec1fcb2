//! Error types for the staking client.
//!
//! This module defines every error the client can surface to its caller.
//! Errors are split by where they originate:
//!
//! ## Error Groups
//! - [`StakingError`]: local validation, raised before any network call
//! - [`GatewayError`]: failures reported by the remote contract client
//! - [`LedgerError`]: what a ledger command returns to the UI layer

use thiserror::Error;

use crate::gateway::TransactionHandle;
use crate::instructions::Operation;

/// Local validation errors for position transitions.
///
/// These are always recoverable and never reach the gateway.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakingError {
    // ========== Input Validation Errors ==========

    /// Cannot stake or withdraw a zero amount.
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    /// A decimal token amount could not be parsed.
    #[error("Invalid token amount")]
    InvalidAmount,

    // ========== State/Balance Errors ==========

    /// User does not have enough staked tokens for the operation.
    #[error("Insufficient staked balance for this operation")]
    InsufficientStakedBalance,

    /// No rewards are available to claim.
    #[error("No rewards available to claim")]
    NoRewardsAvailable,

    /// Nothing is staked, so there is nothing to withdraw.
    #[error("No active stake found for this account")]
    NoActiveStake,

    // ========== Time/Lock Errors ==========

    /// The lock period has not yet ended for this stake.
    #[error("Minimum staking period not met")]
    LockPeriodNotEnded,

    /// Accrual requested for a time before the position was last brought up to date.
    #[error("Invalid timestamp detected")]
    InvalidTimestamp,

    // ========== Math/Overflow Errors ==========

    /// Arithmetic overflow occurred during calculation.
    #[error("Arithmetic overflow occurred during calculation")]
    MathOverflow,
}

/// Errors reported by a [`StakingGateway`](crate::gateway::StakingGateway).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The contract refused the call (revert, failed guard, missing allowance).
    #[error("{}", .reason.as_deref().unwrap_or("operation rejected"))]
    Rejected { reason: Option<String> },

    /// The call never reached the contract or its answer was lost.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Account data returned by the remote could not be decoded.
    #[error("Invalid account data: {0}")]
    InvalidAccountData(String),
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        GatewayError::InvalidAccountData(err.to_string())
    }
}

/// Coarse classification of a [`LedgerError`] for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Rejection,
    Unknown,
    Conflict,
    Busy,
    Transport,
}

/// Errors returned by [`StakingLedger`](crate::ledger::StakingLedger) commands.
///
/// None of these leave the ledger unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] StakingError),

    /// The contract reverted the transaction. The cache holds the last confirmed read.
    #[error("{}", .reason.as_deref().unwrap_or("operation rejected"))]
    Rejected { reason: Option<String> },

    /// Confirmation was not observed in time; the transaction may still land.
    #[error("Transaction {handle} outcome unknown, re-syncing")]
    Unconfirmed { handle: TransactionHandle },

    /// Remote state diverged from the cached position used for validation.
    #[error("State changed, please retry")]
    StaleRead,

    /// Another mutating command for this account has not settled yet.
    #[error("A {operation} operation is already in flight for this account")]
    OperationPending { operation: Operation },

    #[error(transparent)]
    Gateway(GatewayError),
}

impl From<GatewayError> for LedgerError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected { reason } => LedgerError::Rejected { reason },
            other => LedgerError::Gateway(other),
        }
    }
}

impl LedgerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LedgerError::Validation(_) => ErrorCategory::Validation,
            LedgerError::Rejected { .. } => ErrorCategory::Rejection,
            LedgerError::Unconfirmed { .. } => ErrorCategory::Unknown,
            LedgerError::StaleRead => ErrorCategory::Conflict,
            LedgerError::OperationPending { .. } => ErrorCategory::Busy,
            LedgerError::Gateway(_) => ErrorCategory::Transport,
        }
    }
}
