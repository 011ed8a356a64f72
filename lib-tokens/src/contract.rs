//! GenesisToken
//!
//! The fixed-supply token. Its entire lifetime supply is minted inside the
//! constructor and split between the deployer and the emission reservoir.
//!
//! # Invariants
//!
//! - The supply is fixed at construction; there is no mint or burn path
//! - `deployer`, `reservoir` and `lockup_factory` never change after construction
//! - Sum of all balances == `deployer_share + reservoir_share` at all times

use lib_types::{Address, Amount};
use serde::{Deserialize, Serialize};

use crate::errors::{TokenError, TokenResult};
use crate::supply::{SupplySplit, GENESIS_DECIMALS, GENESIS_SUPPLY};
use crate::transfer::{BalanceLedger, TransferResult};

/// Default token name
pub const GENESIS_NAME: &str = "Growth Token";

/// Default token symbol
pub const GENESIS_SYMBOL: &str = "GROW";

/// Read-only balance seam.
///
/// Dependent contracts hold this instead of the token itself so that every
/// balance check is a fresh, synchronous query against the ledger owner.
pub trait BalanceQuery {
    /// Current balance of `holder`
    fn balance_of(&self, holder: &Address) -> Amount;
}

/// Construction parameters that are not addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisParams {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub supply: Amount,
}

impl Default for GenesisParams {
    fn default() -> Self {
        Self {
            name: GENESIS_NAME.to_string(),
            symbol: GENESIS_SYMBOL.to_string(),
            decimals: GENESIS_DECIMALS,
            supply: GENESIS_SUPPLY,
        }
    }
}

/// The genesis token contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisToken {
    // =========================================================================
    // Identity
    // =========================================================================
    /// Address this token is deployed at
    address: Address,
    name: String,
    symbol: String,
    decimals: u8,

    // =========================================================================
    // Genesis record (immutable)
    // =========================================================================
    split: SupplySplit,
    deployer: Address,
    reservoir: Address,
    lockup_factory: Address,

    // =========================================================================
    // Ledger State
    // =========================================================================
    ledger: BalanceLedger,
}

impl GenesisToken {
    /// Construct the token and mint the whole supply.
    ///
    /// Credits `deployer` with `floor(supply * 2 / 3)` and `reservoir` with
    /// `floor(supply / 3)` in the same step. Nothing is returned on failure,
    /// so a half-minted token can never be observed.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if any address (including the token's own) is zero
    pub fn new(
        address: Address,
        params: GenesisParams,
        deployer: Address,
        reservoir: Address,
        lockup_factory: Address,
    ) -> TokenResult<Self> {
        let named = [
            ("token", &address),
            ("deployer", &deployer),
            ("reservoir", &reservoir),
            ("lockup factory", &lockup_factory),
        ];
        for (role, addr) in named {
            if addr.is_zero() {
                return Err(TokenError::InvalidConfiguration(format!(
                    "{} address cannot be zero",
                    role
                )));
            }
        }

        let split = SupplySplit::compute(params.supply);

        let mut ledger = BalanceLedger::new();
        ledger.credit(deployer, split.deployer_share)?;
        ledger.credit(reservoir, split.reservoir_share)?;

        tracing::info!(
            "{}: minted {} to deployer {} and {} to reservoir {} ({} units of dust)",
            params.symbol,
            split.deployer_share,
            deployer,
            split.reservoir_share,
            reservoir,
            split.dust()
        );

        Ok(Self {
            address,
            name: params.name,
            symbol: params.symbol,
            decimals: params.decimals,
            split,
            deployer,
            reservoir,
            lockup_factory,
            ledger,
        })
    }

    // ========================================================================
    // READ OPERATIONS
    // ========================================================================

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// The supply fixed at construction (includes unassigned dust)
    pub fn total_supply(&self) -> Amount {
        self.split.supply
    }

    pub fn supply_split(&self) -> SupplySplit {
        self.split
    }

    /// Address that received the deployer share
    pub fn deployer(&self) -> Address {
        self.deployer
    }

    /// Address that received the reservoir share
    pub fn community_issuance_address(&self) -> Address {
        self.reservoir
    }

    /// Escrow factory recorded at construction
    pub fn lockup_contract_factory(&self) -> Address {
        self.lockup_factory
    }

    /// Balance of an account
    pub fn balance_of(&self, holder: &Address) -> Amount {
        self.ledger.balance_of(holder)
    }

    /// Read-only view of the ledger
    pub fn ledger(&self) -> &BalanceLedger {
        &self.ledger
    }

    // ========================================================================
    // TRANSFER OPERATIONS
    // ========================================================================

    /// Transfer `amount` from `from` to `to`.
    ///
    /// Authorization (that `from` is the caller) is the execution layer's job.
    ///
    /// # Errors
    ///
    /// - `InsufficientBalance` if `amount > balance_of(from)`
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> TokenResult<TransferResult> {
        let result = self.ledger.transfer(from, to, amount)?;
        self.check_conservation()?;
        Ok(result)
    }

    /// Verify the ledger still holds exactly the minted shares
    pub fn check_conservation(&self) -> TokenResult<()> {
        let total = self.ledger.total();
        if total != self.split.minted() {
            return Err(TokenError::ConservationViolated(format!(
                "ledger total {} != minted {}",
                total,
                self.split.minted()
            )));
        }
        Ok(())
    }
}

impl BalanceQuery for GenesisToken {
    fn balance_of(&self, holder: &Address) -> Amount {
        self.ledger.balance_of(holder)
    }
}

impl BalanceQuery for BalanceLedger {
    fn balance_of(&self, holder: &Address) -> Amount {
        BalanceLedger::balance_of(self, holder)
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
