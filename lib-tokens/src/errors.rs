//! Token Errors

use lib_types::Amount;
use thiserror::Error;

/// Error during token operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The ledger total no longer matches the minted shares.
    /// Unreachable through any legitimate call sequence.
    #[error("Conservation invariant violated: {0}")]
    ConservationViolated(String),
}

/// Result type for token operations
pub type TokenResult<T> = Result<T, TokenError>;
