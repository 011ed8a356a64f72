//! Lockup Factory
//!
//! Records who deployed it and when, both immutable. After being wired to
//! the token it creates per-beneficiary escrows funded by the caller.

use lib_tokens::GenesisToken;
use lib_types::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};

use super::escrow::LockupEscrow;
use super::ONE_YEAR_SECS;
use crate::contracts::wiring::{Wiring, WiringState};
use crate::execution::{ContractResult, ExecutionContext, Revert, GAS_DEPLOY, GAS_WIRING};

/// Escrow factory contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockupFactory {
    address: Address,
    deployer: Address,
    deployment_time: Timestamp,
    /// Token address, settable once
    wiring: Wiring<Address>,
}

impl LockupFactory {
    /// Deploy the factory. `deployment_time` is the timestamp of the block
    /// that includes the deployment.
    pub fn new(address: Address, deployer: Address, deployment_time: Timestamp) -> Self {
        Self {
            address,
            deployer,
            deployment_time,
            wiring: Wiring::Unconfigured,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn deployer(&self) -> Address {
        self.deployer
    }

    pub fn deployment_time(&self) -> Timestamp {
        self.deployment_time
    }

    pub fn wiring_state(&self) -> WiringState {
        self.wiring.state()
    }

    pub fn token(&self) -> Option<Address> {
        self.wiring.links().copied()
    }

    /// Earliest release time an escrow from this factory may carry
    pub fn earliest_release_time(&self) -> Option<Timestamp> {
        self.deployment_time.checked_add(ONE_YEAR_SECS)
    }

    /// One-time token wiring, deployer only
    pub fn set_token_address(&mut self, ctx: &mut ExecutionContext, token: Address) -> ContractResult<()> {
        ctx.consume_gas(GAS_WIRING)?;
        ctx.require_caller(&self.deployer)?;
        self.wiring.ensure_unconfigured(ctx)?;

        if token.is_zero() {
            return Err(Revert::InvalidConfiguration("token cannot be zero address".to_string()).into());
        }

        self.wiring.configure(token);
        tracing::info!("Lockup factory {} wired to token {}", self.address, token);
        Ok(())
    }

    /// Create an escrow at `escrow_address` holding `amount` for `beneficiary`
    /// until `release_time`. The caller pays for the escrow.
    pub fn create_escrow(
        &self,
        ctx: &mut ExecutionContext,
        escrow_address: Address,
        beneficiary: Address,
        amount: Amount,
        release_time: Timestamp,
        token: &mut GenesisToken,
    ) -> ContractResult<LockupEscrow> {
        ctx.consume_gas(GAS_DEPLOY)?;

        let token_address = *self.wiring.require()?;

        if beneficiary.is_zero() {
            return Err(Revert::InvalidConfiguration("beneficiary cannot be zero address".to_string()).into());
        }

        let earliest = self.earliest_release_time().ok_or(Revert::Overflow)?;
        if release_time < earliest {
            return Err(Revert::InvalidConfiguration(format!(
                "release time {} is before {}",
                release_time, earliest
            ))
            .into());
        }

        if amount == 0 {
            return Err(Revert::ZeroAmount.into());
        }

        if token.address() != token_address {
            return Err(Revert::InvalidConfiguration(format!(
                "factory is wired to token {}, not {}",
                token_address,
                token.address()
            ))
            .into());
        }

        token.transfer(&ctx.caller, &escrow_address, amount)?;

        tracing::info!(
            "Lockup factory {}: escrow {} holds {} for {} until {}",
            self.address,
            escrow_address,
            amount,
            beneficiary,
            release_time
        );

        Ok(LockupEscrow::new(
            escrow_address,
            token_address,
            beneficiary,
            release_time,
            self.address,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{ContractError, Trap};
    use lib_tokens::GenesisParams;
    use lib_types::TxHash;

    const DEPLOYED_AT: Timestamp = 1_600_000_000;

    fn addr(id: u8) -> Address {
        Address::new([id; 32])
    }

    fn ctx_for(caller: Address) -> ExecutionContext {
        ExecutionContext::new(caller, 2, DEPLOYED_AT + 13, 1_000_000, TxHash::zero())
    }

    fn factory() -> LockupFactory {
        LockupFactory::new(addr(3), addr(1), DEPLOYED_AT)
    }

    fn token() -> GenesisToken {
        GenesisToken::new(addr(9), GenesisParams::default(), addr(1), addr(2), addr(3)).unwrap()
    }

    fn wired() -> LockupFactory {
        let mut factory = factory();
        factory.set_token_address(&mut ctx_for(addr(1)), addr(9)).unwrap();
        factory
    }

    #[test]
    fn test_deployment_record() {
        let factory = factory();
        assert_eq!(factory.deployer(), addr(1));
        assert_eq!(factory.deployment_time(), DEPLOYED_AT);
        assert_eq!(factory.token(), None);
        assert_eq!(factory.wiring_state(), WiringState::Unconfigured);
    }

    #[test]
    fn test_wiring_is_deployer_only_and_once() {
        let mut factory = factory();

        let err = factory.set_token_address(&mut ctx_for(addr(4)), addr(9)).unwrap_err();
        assert_eq!(err, ContractError::Reverted(Revert::Unauthorized { caller: addr(4) }));

        factory.set_token_address(&mut ctx_for(addr(1)), addr(9)).unwrap();
        assert_eq!(factory.token(), Some(addr(9)));

        let err = factory.set_token_address(&mut ctx_for(addr(1)), addr(8)).unwrap_err();
        assert_eq!(err, ContractError::Halted(Trap::AlreadyConfigured));
        assert_eq!(factory.token(), Some(addr(9)));
    }

    #[test]
    fn test_zero_token_rejected() {
        let mut factory = factory();
        let err = factory
            .set_token_address(&mut ctx_for(addr(1)), Address::zero())
            .unwrap_err();
        assert!(err.is_revert());
        assert_eq!(factory.wiring_state(), WiringState::Unconfigured);
    }

    #[test]
    fn test_create_escrow_requires_wiring() {
        let factory = factory();
        let mut token = token();

        let err = factory
            .create_escrow(&mut ctx_for(addr(1)), addr(20), addr(5), 100, DEPLOYED_AT + ONE_YEAR_SECS, &mut token)
            .unwrap_err();

        assert_eq!(err, ContractError::Reverted(Revert::NotConfigured));
    }

    #[test]
    fn test_create_escrow_funds_from_caller() {
        let factory = wired();
        let mut token = token();
        let before = token.balance_of(&addr(1));
        let release = DEPLOYED_AT + ONE_YEAR_SECS;

        let escrow = factory
            .create_escrow(&mut ctx_for(addr(1)), addr(20), addr(5), 500, release, &mut token)
            .unwrap();

        assert_eq!(escrow.address(), addr(20));
        assert_eq!(escrow.beneficiary(), addr(5));
        assert_eq!(escrow.release_time(), release);
        assert_eq!(escrow.factory(), addr(3));
        assert_eq!(token.balance_of(&addr(20)), 500);
        assert_eq!(token.balance_of(&addr(1)), before - 500);
    }

    #[test]
    fn test_release_time_must_be_a_year_out() {
        let factory = wired();
        let mut token = token();

        let err = factory
            .create_escrow(
                &mut ctx_for(addr(1)),
                addr(20),
                addr(5),
                500,
                DEPLOYED_AT + ONE_YEAR_SECS - 1,
                &mut token,
            )
            .unwrap_err();

        assert!(matches!(err, ContractError::Reverted(Revert::InvalidConfiguration(_))));
        assert_eq!(token.balance_of(&addr(20)), 0);
    }

    #[test]
    fn test_unfunded_caller_cannot_create() {
        let factory = wired();
        let mut token = token();

        let err = factory
            .create_escrow(&mut ctx_for(addr(6)), addr(20), addr(5), 1, DEPLOYED_AT + ONE_YEAR_SECS, &mut token)
            .unwrap_err();

        assert_eq!(err, ContractError::Reverted(Revert::InsufficientBalance { have: 0, need: 1 }));
        assert_eq!(token.balance_of(&addr(20)), 0);
    }

    #[test]
    fn test_zero_beneficiary_rejected() {
        let factory = wired();
        let mut token = token();

        let err = factory
            .create_escrow(
                &mut ctx_for(addr(1)),
                addr(20),
                Address::zero(),
                1,
                DEPLOYED_AT + ONE_YEAR_SECS,
                &mut token,
            )
            .unwrap_err();

        assert!(err.is_revert());
    }
}
