//! Transaction Receipts
//!
//! Every transaction submitted to the chain yields a receipt, whether it
//! succeeded or not.

use lib_types::{Address, BlockHeight, Timestamp, TxHash};
use serde::{Deserialize, Serialize};

/// Outcome of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Executed and committed
    Success,
    /// A precondition failed; state rolled back, gas charged up to the failure
    Reverted,
    /// An invariant trap; state rolled back, full gas limit charged
    Halted,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Success => write!(f, "Success"),
            TransactionStatus::Reverted => write!(f, "Reverted"),
            TransactionStatus::Halted => write!(f, "Halted"),
        }
    }
}

/// Receipt for a transaction included in a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub tx_hash: TxHash,
    /// Block the transaction was mined in
    pub block_number: BlockHeight,
    /// Timestamp of that block
    pub timestamp: Timestamp,
    pub caller: Address,
    pub status: TransactionStatus,
    pub gas_used: u64,
    pub gas_limit: u64,
}

impl TransactionReceipt {
    pub fn is_success(&self) -> bool {
        self.status == TransactionStatus::Success
    }
}
