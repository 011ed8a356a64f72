//! Launch Orchestration
//!
//! Deploys the four core contracts in dependency order and then wires the
//! dependents to the token, one transaction per step.

pub mod handles;
pub mod orchestrator;

pub use handles::{CoreAddresses, DeployedLaunch, LaunchError, LaunchStep, WiredLaunch};
pub use orchestrator::LaunchOrchestrator;
