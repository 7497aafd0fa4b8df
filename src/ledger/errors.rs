//! Ledger error types.

use chrono::NaiveDate;
use thiserror::Error;

use crate::game::entities::Coins;

/// Errors from the backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed ledger document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Ledger errors. Store failures are fatal to the request, never to the
/// process.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientFunds { available: Coins, required: Coins },

    #[error("invalid amount: {0}")]
    InvalidAmount(Coins),

    #[error("daily reward already claimed on {0}")]
    AlreadyClaimedToday(NaiveDate),

    #[error("balance overflow")]
    BalanceOverflow,
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
