//! Balance Ledger and Transfer Execution
//!
//! [`BalanceLedger::transfer`] is the only way balances move after genesis.
//! It enforces:
//! - **Sufficient balance**: `amount <= balance_of(from)`, checked before any
//!   mutation so a failed transfer leaves the ledger untouched
//! - **Pairwise conservation**: `from_after + to_after == from_before + to_before`
//! - **Self transfers** are identities

use std::collections::BTreeMap;

use lib_types::{Address, Amount};
use serde::{Deserialize, Serialize};

use crate::errors::{TokenError, TokenResult};

/// Result of a successful transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferResult {
    /// Amount moved from sender to recipient
    pub amount: Amount,
    /// Sender balance after the transfer
    pub from_balance: Amount,
    /// Recipient balance after the transfer
    pub to_balance: Amount,
}

/// Owned address -> balance table.
///
/// Uses BTreeMap for deterministic iteration and serialization.
/// Zero balances are not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceLedger {
    balances: BTreeMap<Address, Amount>,
}

impl BalanceLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of a holder (zero for unknown holders)
    pub fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Sum of every stored balance
    pub fn total(&self) -> Amount {
        self.balances.values().fold(0, |acc, v| acc.saturating_add(*v))
    }

    /// Number of holders with a non-zero balance
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Iterate holders in address order
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter()
    }

    /// Credit a holder. Only the genesis mint and [`Self::transfer`] call this.
    pub(crate) fn credit(&mut self, holder: Address, amount: Amount) -> TokenResult<()> {
        if amount == 0 {
            return Ok(());
        }
        let current = self.balance_of(&holder);
        let updated = current.checked_add(amount).ok_or_else(|| {
            TokenError::ConservationViolated(format!(
                "credit of {} to {} overflows balance {}",
                amount, holder, current
            ))
        })?;
        self.balances.insert(holder, updated);
        Ok(())
    }

    fn set(&mut self, holder: Address, amount: Amount) {
        if amount == 0 {
            self.balances.remove(&holder);
        } else {
            self.balances.insert(holder, amount);
        }
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// - `InsufficientBalance` if `amount > balance_of(from)`
    /// - `ConservationViolated` if the credit would overflow, which can only
    ///   happen if the ledger already holds more than any minted supply
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> TokenResult<TransferResult> {
        let from_balance = self.balance_of(from);
        if amount > from_balance {
            return Err(TokenError::InsufficientBalance {
                have: from_balance,
                need: amount,
            });
        }

        if from == to {
            return Ok(TransferResult {
                amount,
                from_balance,
                to_balance: from_balance,
            });
        }

        let to_balance = self.balance_of(to);
        let new_to_balance = to_balance.checked_add(amount).ok_or_else(|| {
            TokenError::ConservationViolated(format!(
                "recipient {} balance {} cannot absorb {}",
                to, to_balance, amount
            ))
        })?;
        let new_from_balance = from_balance - amount;

        // Both values are computed before either write
        self.set(*from, new_from_balance);
        self.set(*to, new_to_balance);

        tracing::debug!("Ledger: moved {} from {} to {}", amount, from, to);

        Ok(TransferResult {
            amount,
            from_balance: new_from_balance,
            to_balance: new_to_balance,
        })
    }
}
