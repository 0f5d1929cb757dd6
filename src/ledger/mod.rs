//! Persisted per-user click and referral ledger.
//!
//! A single SQLite table guarded by one async mutex, so every operation
//! is atomic with respect to the others regardless of which task calls it.

mod account;
mod error;
mod store;

pub use account::{AdView, ClickSummary, Stats, UserAccount};
pub use error::{LedgerError, Result};
pub use store::LedgerStore;
