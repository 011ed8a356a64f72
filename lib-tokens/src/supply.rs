//! Genesis Supply Split
//!
//! The whole lifetime supply is minted once and split by two independent
//! floor divisions:
//!
//! ```text
//! deployer_share  = floor(supply * 2 / 3)
//! reservoir_share = floor(supply / 3)
//! ```
//!
//! The shares are NOT reconciled against the supply. Whatever the two floors
//! leave behind (`supply - deployer_share - reservoir_share`) is rounding dust
//! that is never assigned to any holder. For the canonical supply of
//! 100 million tokens at 18 decimals exactly one unit is lost.

use lib_types::Amount;
use serde::{Deserialize, Serialize};

// ============================================================================
// CANONICAL CONSTANTS
// ============================================================================

/// Number of decimal places of the genesis token
pub const GENESIS_DECIMALS: u8 = 18;

/// Whole-token supply before decimal scaling (100 million)
pub const GENESIS_WHOLE_TOKENS: Amount = 100_000_000;

/// Canonical genesis supply: 100,000,000 * 10^18 smallest units
pub const GENESIS_SUPPLY: Amount = GENESIS_WHOLE_TOKENS * 10u128.pow(GENESIS_DECIMALS as u32);

// ============================================================================
// SUPPLY SPLIT
// ============================================================================

/// Result of splitting a fixed supply between deployer and reservoir
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplySplit {
    /// The full supply fixed at construction
    pub supply: Amount,
    /// floor(supply * 2 / 3)
    pub deployer_share: Amount,
    /// floor(supply / 3)
    pub reservoir_share: Amount,
}

impl SupplySplit {
    /// Compute the split for a supply.
    ///
    /// `supply * 2` would overflow for supplies above `u128::MAX / 2`, so the
    /// two-thirds share is evaluated as `2q + floor(2r / 3)` with
    /// `supply = 3q + r`, which is the same floor for every input.
    pub const fn compute(supply: Amount) -> Self {
        let q = supply / 3;
        let r = supply % 3;
        Self {
            supply,
            deployer_share: 2 * q + (2 * r) / 3,
            reservoir_share: q,
        }
    }

    /// The canonical genesis split
    pub const fn genesis() -> Self {
        Self::compute(GENESIS_SUPPLY)
    }

    /// Sum of both shares (the amount actually minted to holders)
    pub const fn minted(&self) -> Amount {
        self.deployer_share + self.reservoir_share
    }

    /// Units of supply that are assigned to nobody
    pub const fn dust(&self) -> Amount {
        self.supply - self.minted()
    }
}

/// Reservoir supply cap for a given supply.
///
/// Same formula as [`SupplySplit::reservoir_share`]; the reservoir declares it
/// independently so it can check its own funding against the token ledger.
pub const fn reservoir_cap(supply: Amount) -> Amount {
    supply / 3
}
