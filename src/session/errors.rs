//! Errors surfaced by the session registry.

use thiserror::Error;

use crate::game::entities::Coins;
use crate::game::errors::GameError;
use crate::ledger::errors::LedgerError;

/// Registry-level errors. All recoverable; surfaced to the presentation
/// layer as typed results.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Non-positive wager; rejected before any state change.
    #[error("bet must be a positive number of coins")]
    InvalidBet,

    /// The bet exceeds the player's balance; nothing was debited.
    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientFunds { available: Coins, required: Coins },

    /// A live session already exists for this player.
    #[error("a game is already running for this player")]
    SessionAlreadyActive,

    /// No live session exists for this player.
    #[error("no game is running for this player")]
    NoActiveSession,

    /// Rejected by the session state machine (wrong actor, wrong state,
    /// exhausted deck).
    #[error(transparent)]
    Game(#[from] GameError),

    /// The ledger refused or failed the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
