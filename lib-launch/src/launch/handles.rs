//! Typed launch handles
//!
//! ```text
//! deploy_all --> DeployedLaunch --wire--> WiredLaunch
//! ```
//!
//! `wire` consumes the deployed handle, and a [`WiredLaunch`] can only be
//! produced by a wiring run that succeeded end to end.

use lib_types::{Address, BlockHeight};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::{Chain, TxFailure};
use crate::config::ConfigError;

/// One transaction of the launch sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchStep {
    DeployReservoir,
    DeployLockupFactory,
    DeployStakingLedger,
    DeployToken,
    WireReservoir,
    WireLockupFactory,
    WireStakingLedger,
}

impl std::fmt::Display for LaunchStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchStep::DeployReservoir => write!(f, "deploy reservoir"),
            LaunchStep::DeployLockupFactory => write!(f, "deploy lockup factory"),
            LaunchStep::DeployStakingLedger => write!(f, "deploy staking ledger"),
            LaunchStep::DeployToken => write!(f, "deploy token"),
            LaunchStep::WireReservoir => write!(f, "wire reservoir"),
            LaunchStep::WireLockupFactory => write!(f, "wire lockup factory"),
            LaunchStep::WireStakingLedger => write!(f, "wire staking ledger"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LaunchError {
    #[error("Launch step '{step}' failed: {failure}")]
    StepFailed { step: LaunchStep, failure: TxFailure },

    #[error("Invalid launch configuration: {0}")]
    Config(String),
}

impl From<ConfigError> for LaunchError {
    fn from(err: ConfigError) -> Self {
        LaunchError::Config(err.to_string())
    }
}

impl LaunchError {
    /// Step that failed, if any
    pub fn step(&self) -> Option<LaunchStep> {
        match self {
            LaunchError::StepFailed { step, .. } => Some(*step),
            LaunchError::Config(_) => None,
        }
    }
}

/// External accounts the dependents are wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreAddresses {
    /// Sole recipient of reservoir emissions
    pub fee_recipient: Address,
    /// Sole account that records staking revenue
    pub fee_source: Address,
}

/// Addresses of a deployed but not yet wired launch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedLaunch {
    deployer: Address,
    token: Address,
    reservoir: Address,
    lockup_factory: Address,
    staking_ledger: Address,
    /// Block that included the token deployment
    token_block: BlockHeight,
}

impl DeployedLaunch {
    pub(crate) fn new(
        deployer: Address,
        token: Address,
        reservoir: Address,
        lockup_factory: Address,
        staking_ledger: Address,
        token_block: BlockHeight,
    ) -> Self {
        Self {
            deployer,
            token,
            reservoir,
            lockup_factory,
            staking_ledger,
            token_block,
        }
    }

    pub fn deployer(&self) -> Address {
        self.deployer
    }

    pub fn token(&self) -> Address {
        self.token
    }

    pub fn reservoir(&self) -> Address {
        self.reservoir
    }

    pub fn lockup_factory(&self) -> Address {
        self.lockup_factory
    }

    pub fn staking_ledger(&self) -> Address {
        self.staking_ledger
    }

    pub fn token_block(&self) -> BlockHeight {
        self.token_block
    }

    /// Wire the dependents in order: reservoir, lockup factory, staking ledger.
    ///
    /// Each step is its own transaction sent by the deployer. A failure stops
    /// the sequence; steps already committed stay committed.
    pub fn wire(self, chain: &mut Chain, core: CoreAddresses) -> Result<WiredLaunch, LaunchError> {
        let deployer = self.deployer;

        chain
            .reservoir_set_addresses(deployer, self.reservoir, self.token, core.fee_recipient)
            .map_err(|failure| step_failed(LaunchStep::WireReservoir, failure))?;
        tracing::info!("Wired reservoir {} to token {}", self.reservoir, self.token);

        chain
            .factory_set_token(deployer, self.lockup_factory, self.token)
            .map_err(|failure| step_failed(LaunchStep::WireLockupFactory, failure))?;
        tracing::info!("Wired lockup factory {} to token {}", self.lockup_factory, self.token);

        chain
            .staking_set_addresses(deployer, self.staking_ledger, self.token, core.fee_source)
            .map_err(|failure| step_failed(LaunchStep::WireStakingLedger, failure))?;
        tracing::info!("Wired staking ledger {} to token {}", self.staking_ledger, self.token);

        Ok(WiredLaunch {
            deployed: self,
            core,
            wired_at_block: chain.block_number(),
        })
    }
}

/// A launch whose dependents are all wired to its token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WiredLaunch {
    deployed: DeployedLaunch,
    core: CoreAddresses,
    wired_at_block: BlockHeight,
}

impl WiredLaunch {
    pub fn contracts(&self) -> &DeployedLaunch {
        &self.deployed
    }

    pub fn token(&self) -> Address {
        self.deployed.token
    }

    pub fn reservoir(&self) -> Address {
        self.deployed.reservoir
    }

    pub fn lockup_factory(&self) -> Address {
        self.deployed.lockup_factory
    }

    pub fn staking_ledger(&self) -> Address {
        self.deployed.staking_ledger
    }

    pub fn core(&self) -> CoreAddresses {
        self.core
    }

    pub fn wired_at_block(&self) -> BlockHeight {
        self.wired_at_block
    }
}

pub(crate) fn step_failed(step: LaunchStep, failure: TxFailure) -> LaunchError {
    tracing::error!(
        "Launch step '{}' failed with status {}: {}",
        step,
        failure.receipt.status,
        failure.error
    );
    LaunchError::StepFailed { step, failure }
}
