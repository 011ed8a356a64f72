//! Contract Execution
//!
//! Per-transaction execution context, gas schedule, and the two failure
//! classes every contract operation reports.

pub mod context;
pub mod errors;

pub use context::ExecutionContext;
pub use errors::{ContractError, ContractResult, Revert, Trap};

/// Base gas cost for any contract operation
pub const GAS_BASE: u64 = 1_000;

/// Gas cost for a token balance movement
pub const GAS_TRANSFER: u64 = 2_000;

/// Gas cost for a one-time wiring operation
pub const GAS_WIRING: u64 = 5_000;

/// Gas cost for staking bookkeeping
pub const GAS_STAKING: u64 = 3_000;

/// Gas cost for deploying a contract
pub const GAS_DEPLOY: u64 = 20_000;

/// Default per-transaction gas limit
pub const DEFAULT_GAS_LIMIT: u64 = 6_000_000;
