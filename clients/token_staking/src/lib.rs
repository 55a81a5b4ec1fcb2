//! # Token Staking Client
//!
//! Client-side model of a single-token, time-locked staking contract.
//! The contract is the source of truth; this crate mirrors its position
//! rules so a dashboard can validate commands before sending them and show
//! rewards ticking up between reads.
//!
//! - **Accrual**: flat emission of `rate_per_second` while anything is staked
//! - **Lock**: withdrawal allowed once a stake is 7 days old; top-ups do not
//!   restart the clock, fully withdrawing does
//! - **Exit**: withdraw everything and claim in one step
//!
//! ## Features
//! - 18-decimal fixed-point amounts with checked arithmetic
//! - Per-account ledger cache with pending, rollback and unknown-outcome states
//! - Background polling with scoped start/stop
//! - Display helpers for amounts and lock countdowns

pub mod accrual;
pub mod amount;
pub mod config;
pub mod constants;
pub mod display;
pub mod eligibility;
pub mod error;
pub mod gateway;
pub mod instructions;
pub mod ledger;
pub mod poller;
pub mod state;

pub use amount::TokenAmount;
pub use config::{ConfigError, LedgerConfig};
pub use eligibility::LockStatus;
pub use error::{ErrorCategory, GatewayError, LedgerError, StakingError};
pub use gateway::{PositionSnapshot, StakingGateway, TokenBalances, TransactionHandle, TxOutcome};
pub use instructions::{ExitOutcome, Operation};
pub use ledger::{DisplayState, PoolStats, StakingLedger, SyncState};
pub use poller::Poller;
pub use state::{RewardRateConfig, StakingPosition};
