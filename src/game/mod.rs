//! Core blackjack logic: cards, hands, scoring, and the per-round
//! state machine.
//!
//! This module provides:
//! - Card, deck, and hand entities with the ace-reduction scorer
//! - The session state machine (hit/stand, automatic dealer draws)
//! - Settlement rules mapping final hands to payouts

pub mod entities;
pub mod errors;
pub mod session;
pub mod settlement;

pub use entities::{Card, Coins, Deck, DeckSource, Hand, PlayerId, RandomDeckSource, Suit, Value};
pub use errors::GameError;
pub use session::{DEALER_STAND_SCORE, GameSession, SessionState, Turn};
pub use settlement::{Outcome, Settlement};
