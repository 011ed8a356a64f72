//! Execution Context
//!
//! Immutable-identity, mutable-gas state passed to every contract call.
//! Authority is always derived from `caller`, never from user-supplied
//! parameters.

use lib_types::{Address, BlockHeight, Timestamp, TxHash};
use serde::{Deserialize, Serialize};

use super::errors::{ContractError, ContractResult, Revert, Trap};

/// Contract execution environment state for one transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Account that signed the transaction
    pub caller: Address,
    /// Block the transaction is included in
    pub block_number: BlockHeight,
    /// Timestamp of that block
    pub timestamp: Timestamp,
    /// Maximum gas allowed for this execution
    pub gas_limit: u64,
    /// Gas used so far
    pub gas_used: u64,
    /// Transaction hash that triggered this execution
    pub tx_hash: TxHash,
}

impl ExecutionContext {
    /// Create a new execution context for a user-initiated call
    pub fn new(
        caller: Address,
        block_number: BlockHeight,
        timestamp: Timestamp,
        gas_limit: u64,
        tx_hash: TxHash,
    ) -> Self {
        Self {
            caller,
            block_number,
            timestamp,
            gas_limit,
            gas_used: 0,
            tx_hash,
        }
    }

    /// Check if there's enough gas remaining
    pub fn check_gas(&self, required: u64) -> bool {
        self.gas_used.saturating_add(required) <= self.gas_limit
    }

    /// Consume gas. Running out of gas halts the call.
    pub fn consume_gas(&mut self, amount: u64) -> ContractResult<()> {
        if !self.check_gas(amount) {
            return Err(self.trap(Trap::OutOfGas));
        }
        self.gas_used += amount;
        Ok(())
    }

    /// Get remaining gas
    pub fn remaining_gas(&self) -> u64 {
        self.gas_limit - self.gas_used
    }

    /// Burn whatever budget is left
    pub fn exhaust_gas(&mut self) {
        self.gas_used = self.gas_limit;
    }

    /// Abort with an invariant trap, consuming the whole budget
    pub fn trap(&mut self, trap: Trap) -> ContractError {
        self.exhaust_gas();
        tracing::error!(
            "Execution halted in tx {} (block {}): {:?}",
            self.tx_hash,
            self.block_number,
            trap
        );
        ContractError::Halted(trap)
    }

    /// Revert with `Unauthorized` unless the caller is `expected`
    pub fn require_caller(&self, expected: &Address) -> ContractResult<()> {
        if self.caller != *expected {
            return Err(Revert::Unauthorized {
                caller: self.caller,
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(gas_limit: u64) -> ExecutionContext {
        ExecutionContext::new(Address::new([1u8; 32]), 1, 1_000, gas_limit, TxHash::new([7u8; 32]))
    }

    #[test]
    fn test_consume_gas() {
        let mut ctx = ctx(10_000);
        ctx.consume_gas(4_000).unwrap();
        assert_eq!(ctx.gas_used, 4_000);
        assert_eq!(ctx.remaining_gas(), 6_000);
    }

    #[test]
    fn test_out_of_gas_halts_and_exhausts() {
        let mut ctx = ctx(1_000);
        let err = ctx.consume_gas(1_001).unwrap_err();
        assert_eq!(err, ContractError::Halted(Trap::OutOfGas));
        assert_eq!(ctx.gas_used, 1_000);
        assert_eq!(ctx.remaining_gas(), 0);
    }

    #[test]
    fn test_trap_consumes_full_budget() {
        let mut ctx = ctx(50_000);
        ctx.consume_gas(1_000).unwrap();
        let err = ctx.trap(Trap::AlreadyConfigured);
        assert!(err.is_halt());
        assert_eq!(ctx.gas_used, 50_000);
    }

    #[test]
    fn test_require_caller() {
        let ctx = ctx(10_000);
        assert!(ctx.require_caller(&Address::new([1u8; 32])).is_ok());

        let err = ctx.require_caller(&Address::new([2u8; 32])).unwrap_err();
        assert_eq!(
            err,
            ContractError::Reverted(Revert::Unauthorized {
                caller: Address::new([1u8; 32])
            })
        );
    }
}
