//! # Launch Contracts
//!
//! Dependent contracts of the genesis token. Each owns exactly one
//! [`Wiring`] state machine and its own configuration fields; none of them
//! shares mutable state with another. Cross-contract communication happens
//! only through balance queries and token transfers handed in by the caller.

pub mod lockup;
pub mod math;
pub mod reservoir;
pub mod staking;
pub mod wiring;

pub use lockup::{LockupEscrow, LockupFactory, ONE_YEAR_SECS};
pub use reservoir::{EmissionReservoir, ReservoirLinks};
pub use staking::{StakingLedger, StakingLinks, FEE_PRECISION};
pub use wiring::{Wiring, WiringState};
