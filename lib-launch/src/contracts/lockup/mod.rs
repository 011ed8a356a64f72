//! Time-locked escrows and the factory that creates them

pub mod escrow;
pub mod factory;

pub use escrow::LockupEscrow;
pub use factory::LockupFactory;

/// Minimum lockup measured from the factory's deployment time
pub const ONE_YEAR_SECS: u64 = 365 * 24 * 60 * 60;
