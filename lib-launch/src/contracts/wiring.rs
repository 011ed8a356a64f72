//! One-time wiring state machine
//!
//! ```text
//! Unconfigured --configure--> Configured(links)
//! ```
//!
//! The transition is irreversible. The configured links only exist in the
//! `Configured` state, so a contract cannot read a half-set address.

use serde::{Deserialize, Serialize};

use crate::execution::{ContractResult, ExecutionContext, Revert, Trap};

/// Observable wiring state of a dependent contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WiringState {
    Unconfigured,
    Configured,
}

/// Wiring state together with the links recorded by the one-time setter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wiring<T> {
    Unconfigured,
    Configured(T),
}

impl<T> Default for Wiring<T> {
    fn default() -> Self {
        Wiring::Unconfigured
    }
}

impl<T> Wiring<T> {
    pub fn state(&self) -> WiringState {
        match self {
            Wiring::Unconfigured => WiringState::Unconfigured,
            Wiring::Configured(_) => WiringState::Configured,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Wiring::Configured(_))
    }

    /// Recorded links, if configured
    pub fn links(&self) -> Option<&T> {
        match self {
            Wiring::Unconfigured => None,
            Wiring::Configured(links) => Some(links),
        }
    }

    /// Gate for the one-time setter.
    ///
    /// Re-wiring is an invariant breach, not a user error: it traps.
    pub fn ensure_unconfigured(&self, ctx: &mut ExecutionContext) -> ContractResult<()> {
        if self.is_configured() {
            return Err(ctx.trap(Trap::AlreadyConfigured));
        }
        Ok(())
    }

    /// Links for operations that need a wired contract; reverts otherwise
    pub fn require(&self) -> ContractResult<&T> {
        self.links().ok_or_else(|| Revert::NotConfigured.into())
    }

    /// Record the links. Callers run [`Self::ensure_unconfigured`] and every
    /// other precondition first.
    pub(crate) fn configure(&mut self, links: T) {
        debug_assert!(!self.is_configured());
        *self = Wiring::Configured(links);
    }
}
