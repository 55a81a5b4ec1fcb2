//! State structures mirrored from the staking contract.
//!
//! This module defines the per-account position and the process-wide reward
//! configuration the client caches.

pub mod position;
pub mod reward_config;

pub use position::*;
pub use reward_config::*;
