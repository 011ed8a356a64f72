//! Launch Orchestrator
//!
//! Drives the complete genesis launch against a [`Chain`].
//!
//! # Execution Flow
//!
//! 1. **Deploy dependents** (all `Unconfigured`)
//!    - Emission reservoir, cap = floor(supply / 3)
//!    - Lockup factory, records its deployment block time
//!    - Staking ledger
//!
//! 2. **Deploy token**
//!    - Constructed with the reservoir and factory addresses
//!    - Mints the deployer and reservoir shares in the same transaction
//!
//! 3. **Wire** (see [`DeployedLaunch::wire`])
//!    - Reservoir: `set_addresses(token, fee_recipient)`, checks its balance
//!    - Lockup factory: `set_token_address(token)`
//!    - Staking ledger: `set_addresses(token, fee_source)`

use lib_tokens::GenesisParams;
use lib_types::Address;

use super::handles::{step_failed, CoreAddresses, DeployedLaunch, LaunchError, LaunchStep, WiredLaunch};
use crate::chain::Chain;
use crate::config::LaunchConfig;

/// Launch orchestrator
#[derive(Debug, Clone)]
pub struct LaunchOrchestrator {
    config: LaunchConfig,
    params: GenesisParams,
    /// Every launch wired through this orchestrator
    launches: Vec<WiredLaunch>,
}

impl LaunchOrchestrator {
    /// Create an orchestrator for a validated configuration
    pub fn new(config: LaunchConfig) -> Result<Self, LaunchError> {
        config.validate()?;
        let params = config.genesis_params()?;
        Ok(Self {
            config,
            params,
            launches: Vec::new(),
        })
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    pub fn genesis_params(&self) -> &GenesisParams {
        &self.params
    }

    pub fn launches(&self) -> &[WiredLaunch] {
        &self.launches
    }

    /// Fresh chain using this launch's chain settings
    pub fn new_chain(&self) -> Chain {
        Chain::new(self.config.chain.clone())
    }

    /// Deploy reservoir, lockup factory and staking ledger, then the token.
    pub fn deploy_all(&self, chain: &mut Chain, deployer: Address) -> Result<DeployedLaunch, LaunchError> {
        let reservoir = chain
            .deploy_reservoir(deployer, self.params.supply)
            .map_err(|failure| step_failed(LaunchStep::DeployReservoir, failure))?
            .output;

        let lockup_factory = chain
            .deploy_lockup_factory(deployer)
            .map_err(|failure| step_failed(LaunchStep::DeployLockupFactory, failure))?
            .output;

        let staking_ledger = chain
            .deploy_staking_ledger(deployer)
            .map_err(|failure| step_failed(LaunchStep::DeployStakingLedger, failure))?
            .output;

        let token = chain
            .deploy_token(deployer, self.params.clone(), reservoir, lockup_factory)
            .map_err(|failure| step_failed(LaunchStep::DeployToken, failure))?;

        tracing::info!(
            "Deployed launch for {}: token {}, reservoir {}, lockup factory {}, staking ledger {}",
            deployer,
            token.output,
            reservoir,
            lockup_factory,
            staking_ledger
        );

        Ok(DeployedLaunch::new(
            deployer,
            token.output,
            reservoir,
            lockup_factory,
            staking_ledger,
            token.receipt.block_number,
        ))
    }

    /// Wire a deployed launch and record it
    pub fn wire_all(
        &mut self,
        chain: &mut Chain,
        deployed: DeployedLaunch,
        core: CoreAddresses,
    ) -> Result<WiredLaunch, LaunchError> {
        let wired = deployed.wire(chain, core)?;
        self.launches.push(wired.clone());
        tracing::info!(
            "Launch of token {} fully wired at block {}",
            wired.token(),
            wired.wired_at_block()
        );
        Ok(wired)
    }

    /// Deploy and wire in one go
    pub fn launch(
        &mut self,
        chain: &mut Chain,
        deployer: Address,
        core: CoreAddresses,
    ) -> Result<WiredLaunch, LaunchError> {
        let deployed = self.deploy_all(chain, deployer)?;
        self.wire_all(chain, deployed, core)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use crate::contracts::WiringState;

    fn addr(id: u8) -> Address {
        Address::new([id; 32])
    }

    fn core() -> CoreAddresses {
        CoreAddresses {
            fee_recipient: addr(50),
            fee_source: addr(51),
        }
    }

    #[test]
    fn test_launch_wires_everything() {
        let mut orchestrator = LaunchOrchestrator::new(LaunchConfig::default()).unwrap();
        let mut chain = orchestrator.new_chain();

        let wired = orchestrator.launch(&mut chain, addr(1), core()).unwrap();

        let state = chain.state();
        assert_eq!(state.reservoir(&wired.reservoir()).unwrap().wiring_state(), WiringState::Configured);
        assert_eq!(state.lockup_factory(&wired.lockup_factory()).unwrap().token(), Some(wired.token()));
        assert_eq!(state.staking_ledger(&wired.staking_ledger()).unwrap().token(), Some(wired.token()));
        assert_eq!(orchestrator.launches().len(), 1);
        assert_eq!(chain.block_number(), 7);
        assert_eq!(wired.contracts().token_block(), 4);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = LaunchConfig {
            token: TokenConfig {
                supply_whole_tokens: 0,
                ..TokenConfig::default()
            },
            ..LaunchConfig::default()
        };

        assert!(matches!(LaunchOrchestrator::new(config), Err(LaunchError::Config(_))));
    }

    #[test]
    fn test_wiring_failure_names_step() {
        let mut orchestrator = LaunchOrchestrator::new(LaunchConfig::default()).unwrap();
        let mut chain = orchestrator.new_chain();
        let deployed = orchestrator.deploy_all(&mut chain, addr(1)).unwrap();

        let bad_core = CoreAddresses {
            fee_recipient: addr(50),
            fee_source: Address::zero(),
        };
        let err = orchestrator.wire_all(&mut chain, deployed, bad_core).unwrap_err();

        assert_eq!(err.step(), Some(LaunchStep::WireStakingLedger));
        assert!(orchestrator.launches().is_empty());
    }
}
