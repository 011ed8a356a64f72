//! Genesis launch primitives.
//! Stable, contract-neutral, behavior-free.
//!
//! Rule: No String identifiers in ledger state. Ever.

pub mod primitives;

pub use primitives::{Address, Amount, BlockHeight, Timestamp, TxHash};
