//! Execution Errors
//!
//! Two failure classes that are never collapsed into one:
//!
//! - [`Revert`]: a validated precondition failed. The caller made a mistake,
//!   state is untouched, only the gas spent so far is charged, and the reason
//!   is reported.
//! - [`Trap`]: an internal invariant was breached. Execution halts, the whole
//!   gas budget is consumed, and the caller only ever sees
//!   `execution halted`. The trap kind is kept for logs and auditors.

use lib_tokens::TokenError;
use lib_types::{Address, Amount, Timestamp};
use thiserror::Error;

/// Graceful rejection of a call whose preconditions do not hold
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Revert {
    #[error("Unauthorized caller {caller}")]
    Unauthorized { caller: Address },

    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Contract is not configured")]
    NotConfigured,

    #[error("Amount must be non-zero")]
    ZeroAmount,

    #[error("Caller has no stake")]
    NoStake,

    #[error("Lockup active until {release_time}, now {now}")]
    LockupActive { release_time: Timestamp, now: Timestamp },

    #[error("Issuance cap exceeded: cap {cap}, would issue {would_issue}")]
    CapExceeded { cap: Amount, would_issue: Amount },

    #[error("No contract deployed at {0}")]
    UnknownContract(Address),

    #[error("Arithmetic overflow")]
    Overflow,
}

/// Invariant breach that should be unreachable through legitimate use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trap {
    /// A one-time wiring operation was invoked on a configured contract
    AlreadyConfigured,
    /// The reservoir holds less than its supply cap at wiring time
    ReservoirUnderfunded,
    /// The transaction ran out of gas
    OutOfGas,
    /// The token ledger no longer conserves the minted supply
    LedgerCorrupted,
}

/// Error returned by every contract operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("reverted: {0}")]
    Reverted(#[from] Revert),

    /// Display omits the trap kind
    #[error("execution halted")]
    Halted(Trap),
}

impl ContractError {
    /// True for invariant traps
    pub fn is_halt(&self) -> bool {
        matches!(self, ContractError::Halted(_))
    }

    /// True for graceful precondition failures
    pub fn is_revert(&self) -> bool {
        matches!(self, ContractError::Reverted(_))
    }

    /// The revert reason, if this is a revert
    pub fn revert_reason(&self) -> Option<&Revert> {
        match self {
            ContractError::Reverted(reason) => Some(reason),
            ContractError::Halted(_) => None,
        }
    }
}

impl From<TokenError> for ContractError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InsufficientBalance { have, need } => {
                ContractError::Reverted(Revert::InsufficientBalance { have, need })
            }
            TokenError::InvalidConfiguration(msg) => {
                ContractError::Reverted(Revert::InvalidConfiguration(msg))
            }
            TokenError::ConservationViolated(msg) => {
                tracing::error!("Token ledger invariant breached: {}", msg);
                ContractError::Halted(Trap::LedgerCorrupted)
            }
        }
    }
}

/// Result type for contract operations
pub type ContractResult<T> = Result<T, ContractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halt_message_has_no_detail() {
        for trap in [
            Trap::AlreadyConfigured,
            Trap::ReservoirUnderfunded,
            Trap::OutOfGas,
            Trap::LedgerCorrupted,
        ] {
            assert_eq!(ContractError::Halted(trap).to_string(), "execution halted");
        }
    }

    #[test]
    fn test_revert_message_names_reason() {
        let err = ContractError::from(Revert::NotConfigured);
        assert_eq!(err.to_string(), "reverted: Contract is not configured");
        assert!(err.is_revert());
        assert!(!err.is_halt());
        assert_eq!(err.revert_reason(), Some(&Revert::NotConfigured));
    }

    #[test]
    fn test_token_error_mapping() {
        let insufficient = ContractError::from(TokenError::InsufficientBalance { have: 1, need: 2 });
        assert_eq!(
            insufficient,
            ContractError::Reverted(Revert::InsufficientBalance { have: 1, need: 2 })
        );

        let invalid = ContractError::from(TokenError::InvalidConfiguration("zero".into()));
        assert!(matches!(
            invalid,
            ContractError::Reverted(Revert::InvalidConfiguration(_))
        ));

        let corrupted = ContractError::from(TokenError::ConservationViolated("drift".into()));
        assert_eq!(corrupted, ContractError::Halted(Trap::LedgerCorrupted));
    }
}
