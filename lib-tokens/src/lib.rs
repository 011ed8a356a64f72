//! Genesis Token Primitives
//!
//! This crate defines the fixed-supply token that is minted exactly once at
//! construction and then behaves as a plain transferable balance ledger.
//!
//! Contract wiring and transaction semantics are enforced in `lib-launch`.
//!
//! # Key Types
//!
//! - [`SupplySplit`]: The floor-division split of the supply between the
//!   deployer and the emission reservoir
//! - [`GenesisToken`]: The token contract with its immutable genesis metadata
//! - [`BalanceLedger`]: The owned balance table behind the token
//! - [`BalanceQuery`]: Read-only balance seam used by dependent contracts
//!
//! # Execution
//!
//! Use [`GenesisToken::transfer`] to move balances with full validation.

pub mod contract;
pub mod errors;
pub mod supply;
pub mod transfer;

pub use contract::{BalanceQuery, GenesisParams, GenesisToken};
pub use errors::*;
pub use supply::*;
pub use transfer::{BalanceLedger, TransferResult};
