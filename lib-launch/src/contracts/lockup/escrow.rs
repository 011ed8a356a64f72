use lib_tokens::GenesisToken;
use lib_types::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};

use crate::execution::{ContractResult, ExecutionContext, Revert, GAS_TRANSFER};

/// Tokens held for a single beneficiary until a release time.
///
/// Every field is fixed at creation. The factory keeps no reference back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockupEscrow {
    address: Address,
    token: Address,
    beneficiary: Address,
    release_time: Timestamp,
    factory: Address,
}

impl LockupEscrow {
    pub(crate) fn new(
        address: Address,
        token: Address,
        beneficiary: Address,
        release_time: Timestamp,
        factory: Address,
    ) -> Self {
        Self {
            address,
            token,
            beneficiary,
            release_time,
            factory,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn token(&self) -> Address {
        self.token
    }

    pub fn beneficiary(&self) -> Address {
        self.beneficiary
    }

    pub fn release_time(&self) -> Timestamp {
        self.release_time
    }

    pub fn factory(&self) -> Address {
        self.factory
    }

    pub fn is_released(&self, now: Timestamp) -> bool {
        now >= self.release_time
    }

    /// Release the escrow's entire balance to the beneficiary
    pub fn withdraw(&self, ctx: &mut ExecutionContext, token: &mut GenesisToken) -> ContractResult<Amount> {
        ctx.consume_gas(GAS_TRANSFER)?;
        ctx.require_caller(&self.beneficiary)?;

        if !self.is_released(ctx.timestamp) {
            return Err(Revert::LockupActive {
                release_time: self.release_time,
                now: ctx.timestamp,
            }
            .into());
        }

        if token.address() != self.token {
            return Err(Revert::UnknownContract(token.address()).into());
        }

        let amount = token.balance_of(&self.address);
        if amount == 0 {
            return Err(Revert::ZeroAmount.into());
        }

        token.transfer(&self.address, &self.beneficiary, amount)?;

        tracing::debug!(
            "Escrow {} released {} to {}",
            self.address,
            amount,
            self.beneficiary
        );

        Ok(amount)
    }
}
