//! Ledger error types.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("user {0} is not registered")]
    NotRegistered(i64),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl LedgerError {
    /// Returns true if the error only means the user has no ledger row.
    #[must_use]
    pub const fn is_not_registered(&self) -> bool {
        matches!(self, Self::NotRegistered(_))
    }
}
