//! Session state machine error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a game session rejecting an action. None of these
/// advance the session state.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("not your game")]
    NotAuthorized,
    #[error("no actions allowed right now")]
    InvalidState,
    #[error("the deck is out of cards")]
    DeckExhausted,
}
