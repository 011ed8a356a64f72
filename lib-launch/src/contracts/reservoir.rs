//! Emission Reservoir
//!
//! Holds the reservoir share of the genesis supply for later programmatic
//! emission. It is deployed before the token, receives its share inside the
//! token's constructor, and is then wired exactly once by its owner.
//!
//! # Wiring preconditions (checked in this order)
//!
//! 1. caller is `owner`, else revert `Unauthorized`
//! 2. wiring is `Unconfigured`, else trap
//! 3. `token.balance_of(self) >= supply_cap`, queried at call time, else trap
//! 4. fee recipient is non-zero, else revert `InvalidConfiguration`
//!
//! The balance is read from the token on every wiring attempt, never from
//! construction-time accounting.

use lib_tokens::{reservoir_cap, BalanceQuery, GenesisToken, GENESIS_SUPPLY};
use lib_types::{Address, Amount};
use serde::{Deserialize, Serialize};

use crate::contracts::wiring::{Wiring, WiringState};
use crate::execution::{
    ContractResult, ExecutionContext, Revert, Trap, GAS_TRANSFER, GAS_WIRING,
};

/// Addresses recorded by [`EmissionReservoir::set_addresses`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservoirLinks {
    /// The genesis token
    pub token: Address,
    /// The only account allowed to draw emissions (e.g. a stability pool)
    pub fee_recipient: Address,
}

/// Emission reservoir contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionReservoir {
    address: Address,
    owner: Address,
    /// floor(supply / 3), fixed at construction
    supply_cap: Amount,
    wiring: Wiring<ReservoirLinks>,
    /// Cumulative amount sent out through [`Self::send_to`]
    total_issued: Amount,
}

impl EmissionReservoir {
    /// Deploy a reservoir sized for the canonical genesis supply
    pub fn new(address: Address, owner: Address) -> Self {
        Self::with_supply(address, owner, GENESIS_SUPPLY)
    }

    /// Deploy a reservoir whose cap is derived from `supply`
    pub fn with_supply(address: Address, owner: Address, supply: Amount) -> Self {
        Self {
            address,
            owner,
            supply_cap: reservoir_cap(supply),
            wiring: Wiring::Unconfigured,
            total_issued: 0,
        }
    }

    // ========================================================================
    // READ OPERATIONS
    // ========================================================================

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// The reservoir's declared supply cap
    pub fn supply_cap(&self) -> Amount {
        self.supply_cap
    }

    pub fn wiring_state(&self) -> WiringState {
        self.wiring.state()
    }

    pub fn links(&self) -> Option<&ReservoirLinks> {
        self.wiring.links()
    }

    /// Token address, once wired
    pub fn token(&self) -> Option<Address> {
        self.wiring.links().map(|l| l.token)
    }

    /// Fee recipient address, once wired
    pub fn fee_recipient(&self) -> Option<Address> {
        self.wiring.links().map(|l| l.fee_recipient)
    }

    pub fn total_issued(&self) -> Amount {
        self.total_issued
    }

    // ========================================================================
    // WIRING
    // ========================================================================

    /// One-time wiring to the token and the fee recipient.
    ///
    /// `token` must be the contract deployed at `token_address`; the caller
    /// resolves it. An address with no token behind it reports a zero balance.
    pub fn set_addresses(
        &mut self,
        ctx: &mut ExecutionContext,
        token_address: Address,
        fee_recipient: Address,
        token: &dyn BalanceQuery,
    ) -> ContractResult<()> {
        ctx.consume_gas(GAS_WIRING)?;

        ctx.require_caller(&self.owner)?;

        self.wiring.ensure_unconfigured(ctx)?;

        let balance = token.balance_of(&self.address);
        if balance < self.supply_cap {
            tracing::error!(
                "Reservoir {}: balance {} below supply cap {}",
                self.address,
                balance,
                self.supply_cap
            );
            return Err(ctx.trap(Trap::ReservoirUnderfunded));
        }

        if fee_recipient.is_zero() {
            return Err(Revert::InvalidConfiguration(
                "fee recipient cannot be zero address".to_string(),
            )
            .into());
        }

        self.wiring.configure(ReservoirLinks {
            token: token_address,
            fee_recipient,
        });

        tracing::info!(
            "Reservoir {} wired: token {}, fee recipient {}",
            self.address,
            token_address,
            fee_recipient
        );

        Ok(())
    }

    // ========================================================================
    // EMISSION
    // ========================================================================

    /// Send reserved tokens to `to`.
    ///
    /// Only the wired fee recipient may draw, and never more than the supply
    /// cap in total. The emission schedule itself lives with the caller.
    pub fn send_to(
        &mut self,
        ctx: &mut ExecutionContext,
        to: Address,
        amount: Amount,
        token: &mut GenesisToken,
    ) -> ContractResult<()> {
        ctx.consume_gas(GAS_TRANSFER)?;

        let links = *self.wiring.require()?;
        ctx.require_caller(&links.fee_recipient)?;

        if amount == 0 {
            return Err(Revert::ZeroAmount.into());
        }

        if token.address() != links.token {
            return Err(Revert::InvalidConfiguration(format!(
                "reservoir is wired to token {}, not {}",
                links.token,
                token.address()
            ))
            .into());
        }

        let would_issue = self
            .total_issued
            .checked_add(amount)
            .ok_or(Revert::Overflow)?;
        if would_issue > self.supply_cap {
            return Err(Revert::CapExceeded {
                cap: self.supply_cap,
                would_issue,
            }
            .into());
        }

        token.transfer(&self.address, &to, amount)?;
        self.total_issued = would_issue;

        tracing::debug!(
            "Reservoir {}: sent {} to {} (issued {} of {})",
            self.address,
            amount,
            to,
            self.total_issued,
            self.supply_cap
        );

        Ok(())
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================
