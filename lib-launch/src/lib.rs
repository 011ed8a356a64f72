//! # Genesis Launch Contracts
//!
//! Turns a set of freshly deployed, mutually unaware contracts into a
//! consistently wired system:
//!
//! - [`GenesisToken`](lib_tokens::GenesisToken) mints its fixed supply at construction
//! - [`EmissionReservoir`] holds the reservoir share and may only be wired once
//!   its balance covers its supply cap
//! - [`LockupFactory`] records its deployment and creates time-locked escrows
//! - [`StakingLedger`] relays stake and fee revenue once wired
//! - [`LaunchOrchestrator`] deploys everything and drives the wiring order
//!
//! Every operation runs as one serialized transaction on a [`Chain`]: it
//! either completes or leaves state exactly as it was.

pub mod chain;
pub mod config;
pub mod contracts;
pub mod execution;
pub mod launch;
pub mod receipts;

pub use chain::{Chain, Executed, TxFailure, TxResult, WorldState};
pub use config::{ChainConfig, ConfigError, LaunchConfig, TokenConfig};
pub use contracts::{
    EmissionReservoir, LockupEscrow, LockupFactory, ReservoirLinks, StakingLedger, StakingLinks,
    Wiring, WiringState,
};
pub use execution::{ContractError, ContractResult, ExecutionContext, Revert, Trap};
pub use launch::{CoreAddresses, DeployedLaunch, LaunchError, LaunchOrchestrator, LaunchStep, WiredLaunch};
pub use receipts::{TransactionReceipt, TransactionStatus};
