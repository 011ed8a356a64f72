//! Staking Ledger
//!
//! Holds staked genesis tokens and shares recorded protocol fees pro rata
//! between stakers.
//!
//! # Revenue accounting
//!
//! Fees are folded into a single accumulator, `fee_per_unit_staked`, scaled by
//! [`FEE_PRECISION`]. Each staker keeps a snapshot of the accumulator taken
//! when their stake last changed; their gain since then is
//! `stake * (acc - snapshot) / FEE_PRECISION`. Gains are settled into a
//! claimable balance on every stake and unstake, so changing a stake never
//! re-prices past fees. Products are taken at 256 bits through
//! [`mul_div_floor`], so 18-decimal stakes and fees never overflow mid-way.
//!
//! Revenue is accounting only. Settlement never blocks principal: if a gain
//! cannot be represented, the staker's claimable balance saturates and the
//! stake movement still goes through.
//!
//! # Invariants
//!
//! - `total_staked` == sum of all stakes == tokens held at the ledger address
//!   from staking
//! - Unstaking never returns more than the staker put in

use std::collections::BTreeMap;

use lib_tokens::GenesisToken;
use lib_types::{Address, Amount};
use serde::{Deserialize, Serialize};

use crate::contracts::math::mul_div_floor;
use crate::contracts::wiring::{Wiring, WiringState};
use crate::execution::{
    ContractResult, ExecutionContext, Revert, GAS_BASE, GAS_STAKING, GAS_WIRING,
};

/// Scale of the fee accumulator
pub const FEE_PRECISION: u128 = 1_000_000_000_000_000_000;

/// Addresses recorded by [`StakingLedger::set_addresses`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingLinks {
    pub token: Address,
    /// Only account allowed to record fees
    pub fee_source: Address,
}

/// Staking ledger contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakingLedger {
    address: Address,
    owner: Address,
    wiring: Wiring<StakingLinks>,

    /// Staker -> staked amount (no zero entries)
    stakes: BTreeMap<Address, Amount>,
    total_staked: Amount,

    /// Cumulative fees per staked unit, scaled by FEE_PRECISION
    fee_per_unit_staked: u128,
    /// Accumulator value at each staker's last settlement
    snapshots: BTreeMap<Address, u128>,
    /// Settled, unclaimed revenue
    claimable: BTreeMap<Address, Amount>,
    /// Fees recorded while nothing was staked
    undistributed_fees: Amount,
}

impl StakingLedger {
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            owner,
            wiring: Wiring::Unconfigured,
            stakes: BTreeMap::new(),
            total_staked: 0,
            fee_per_unit_staked: 0,
            snapshots: BTreeMap::new(),
            claimable: BTreeMap::new(),
            undistributed_fees: 0,
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

    pub fn wiring_state(&self) -> WiringState {
        self.wiring.state()
    }

    pub fn token(&self) -> Option<Address> {
        self.wiring.links().map(|l| l.token)
    }

    pub fn fee_source(&self) -> Option<Address> {
        self.wiring.links().map(|l| l.fee_source)
    }

    pub fn stake_of(&self, staker: &Address) -> Amount {
        self.stakes.get(staker).copied().unwrap_or(0)
    }

    pub fn total_staked(&self) -> Amount {
        self.total_staked
    }

    pub fn staker_count(&self) -> usize {
        self.stakes.len()
    }

    pub fn fee_per_unit_staked(&self) -> u128 {
        self.fee_per_unit_staked
    }

    pub fn undistributed_fees(&self) -> Amount {
        self.undistributed_fees
    }

    /// Revenue earned since the staker's last settlement
    pub fn pending_gain(&self, staker: &Address) -> ContractResult<Amount> {
        let stake = self.stake_of(staker);
        let snapshot = self.snapshots.get(staker).copied().unwrap_or(0);
        let delta = self.fee_per_unit_staked.saturating_sub(snapshot);
        mul_div_floor(stake, delta, FEE_PRECISION).ok_or_else(|| Revert::Overflow.into())
    }

    /// Settled revenue plus pending gain
    pub fn claimable_revenue(&self, staker: &Address) -> ContractResult<Amount> {
        let settled = self.claimable.get(staker).copied().unwrap_or(0);
        settled
            .checked_add(self.pending_gain(staker)?)
            .ok_or_else(|| Revert::Overflow.into())
    }

    /// Claimable revenue for settlement during a stake movement, saturating
    /// at `Amount::MAX` instead of failing
    fn settled_revenue(&self, staker: &Address) -> Amount {
        match self.claimable_revenue(staker) {
            Ok(amount) => amount,
            Err(_) => {
                tracing::warn!(
                    "Staking ledger {}: revenue of {} saturated during settlement",
                    self.address,
                    staker
                );
                Amount::MAX
            }
        }
    }

    // ========================================================================
    // WIRING
    // ========================================================================

    /// One-time wiring, owner only
    pub fn set_addresses(
        &mut self,
        ctx: &mut ExecutionContext,
        token: Address,
        fee_source: Address,
    ) -> ContractResult<()> {
        ctx.consume_gas(GAS_WIRING)?;
        ctx.require_caller(&self.owner)?;
        self.wiring.ensure_unconfigured(ctx)?;

        if token.is_zero() || fee_source.is_zero() {
            return Err(Revert::InvalidConfiguration(
                "token and fee source must be non-zero".to_string(),
            )
            .into());
        }

        self.wiring.configure(StakingLinks { token, fee_source });
        tracing::info!(
            "Staking ledger {} wired: token {}, fee source {}",
            self.address,
            token,
            fee_source
        );
        Ok(())
    }

    // ========================================================================
    // STAKING
    // ========================================================================

    /// Move `amount` of the caller's tokens into the ledger
    pub fn stake(
        &mut self,
        ctx: &mut ExecutionContext,
        amount: Amount,
        token: &mut GenesisToken,
    ) -> ContractResult<()> {
        ctx.consume_gas(GAS_STAKING)?;
        let links = *self.wiring.require()?;
        self.check_token(&links, token)?;

        if amount == 0 {
            return Err(Revert::ZeroAmount.into());
        }

        let staker = ctx.caller;
        let new_stake = self.stake_of(&staker).checked_add(amount).ok_or(Revert::Overflow)?;
        let new_total = self.total_staked.checked_add(amount).ok_or(Revert::Overflow)?;
        let settled = self.settled_revenue(&staker);

        token.transfer(&staker, &self.address, amount)?;

        self.settle(staker, settled);
        self.stakes.insert(staker, new_stake);
        self.total_staked = new_total;

        tracing::debug!(
            "Staking ledger {}: {} staked {} (now {}, total {})",
            self.address,
            staker,
            amount,
            new_stake,
            new_total
        );
        Ok(())
    }

    /// Withdraw up to `amount` of the caller's stake. Returns the amount
    /// actually withdrawn.
    pub fn unstake(
        &mut self,
        ctx: &mut ExecutionContext,
        amount: Amount,
        token: &mut GenesisToken,
    ) -> ContractResult<Amount> {
        ctx.consume_gas(GAS_STAKING)?;
        let links = *self.wiring.require()?;
        self.check_token(&links, token)?;

        let staker = ctx.caller;
        let current = self.stake_of(&staker);
        if current == 0 {
            return Err(Revert::NoStake.into());
        }
        if amount == 0 {
            return Err(Revert::ZeroAmount.into());
        }

        let withdrawn = amount.min(current);
        let settled = self.settled_revenue(&staker);

        token.transfer(&self.address, &staker, withdrawn)?;

        self.settle(staker, settled);
        let remaining = current - withdrawn;
        if remaining == 0 {
            self.stakes.remove(&staker);
            self.snapshots.remove(&staker);
        } else {
            self.stakes.insert(staker, remaining);
        }
        self.total_staked -= withdrawn;

        tracing::debug!(
            "Staking ledger {}: {} unstaked {} (remaining {})",
            self.address,
            staker,
            withdrawn,
            remaining
        );
        Ok(withdrawn)
    }

    // ========================================================================
    // REVENUE
    // ========================================================================

    /// Record protocol fees for distribution to current stakers
    pub fn record_fee(&mut self, ctx: &mut ExecutionContext, amount: Amount) -> ContractResult<()> {
        ctx.consume_gas(GAS_BASE)?;
        let links = *self.wiring.require()?;
        ctx.require_caller(&links.fee_source)?;

        if amount == 0 {
            return Err(Revert::ZeroAmount.into());
        }

        if self.total_staked == 0 {
            self.undistributed_fees = self
                .undistributed_fees
                .checked_add(amount)
                .ok_or(Revert::Overflow)?;
            tracing::warn!(
                "Staking ledger {}: fee of {} recorded with nothing staked",
                self.address,
                amount
            );
            return Ok(());
        }

        let increment =
            mul_div_floor(amount, FEE_PRECISION, self.total_staked).ok_or(Revert::Overflow)?;
        self.fee_per_unit_staked = self
            .fee_per_unit_staked
            .checked_add(increment)
            .ok_or(Revert::Overflow)?;

        tracing::debug!(
            "Staking ledger {}: fee {} over {} staked (acc {})",
            self.address,
            amount,
            self.total_staked,
            self.fee_per_unit_staked
        );
        Ok(())
    }

    /// Settle and clear the caller's revenue record, returning the amount
    /// cleared. Accounting only: no tokens move, the returned amount is what
    /// the fee source owes the caller.
    pub fn claim_revenue(&mut self, ctx: &mut ExecutionContext) -> ContractResult<Amount> {
        ctx.consume_gas(GAS_BASE)?;
        self.wiring.require()?;

        let staker = ctx.caller;
        let amount = self.claimable_revenue(&staker)?;
        if amount == 0 {
            return Err(Revert::ZeroAmount.into());
        }

        self.settle(staker, 0);
        tracing::debug!("Staking ledger {}: {} claimed {}", self.address, staker, amount);
        Ok(amount)
    }

    fn settle(&mut self, staker: Address, claimable: Amount) {
        self.snapshots.insert(staker, self.fee_per_unit_staked);
        if claimable == 0 {
            self.claimable.remove(&staker);
        } else {
            self.claimable.insert(staker, claimable);
        }
    }

    fn check_token(&self, links: &StakingLinks, token: &GenesisToken) -> ContractResult<()> {
        if token.address() != links.token {
            return Err(Revert::UnknownContract(token.address()).into());
        }
        Ok(())
    }
}
