//! # Coin Blackjack
//!
//! A single-player blackjack engine wagering from a persistent per-player
//! coin ledger.
//!
//! The crate is the game core behind a chat front-end: the presentation
//! layer parses commands and renders views; everything stateful lives
//! here. A round binds one shuffled deck, one wager, and two hands to one
//! player and runs a three-phase state machine:
//!
//! - **AwaitingPlayerAction**: the player hits or stands
//! - **DealerTurn**: the dealer draws to 17
//! - **Settled**: the outcome pays out and the session is destroyed
//!
//! A player bust (or a hit to exactly 21) settles immediately without a
//! dealer turn.
//!
//! ## Core Modules
//!
//! - [`game`]: cards, hands, scoring, and the session state machine
//! - [`ledger`]: atomic coin balances and the once-per-day grant
//! - [`session`]: the registry enforcing one live session per player,
//!   with a dedicated actor task serializing each session's actions
//!
//! ## Example
//!
//! ```no_run
//! use coin_blackjack::{
//!     ledger::{LedgerManager, MemoryStore},
//!     session::SessionManager,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ledger = Arc::new(LedgerManager::new(Arc::new(MemoryStore::default())));
//!     ledger.credit(1, 500).await?;
//!
//!     let sessions = SessionManager::new(ledger);
//!     let view = sessions.start(1, 100).await?;
//!     println!("player holds {} cards", view.player_cards.len());
//!
//!     let view = sessions.stand(1).await?;
//!     println!("outcome: {:?}, balance: {:?}", view.outcome, view.balance);
//!     Ok(())
//! }
//! ```

/// Core blackjack logic: cards, hands, scoring, session state machine.
pub mod game;
pub use game::{
    Card, Coins, DEALER_STAND_SCORE, Deck, DeckSource, GameError, GameSession, Hand, Outcome,
    PlayerId, RandomDeckSource, SessionState, Settlement, Suit, Turn,
};

/// Coin ledger: balances, atomic debit/credit, daily grant.
pub mod ledger;
pub use ledger::{LedgerError, LedgerManager, LedgerStore};

/// Session registry and per-session actors.
pub mod session;
pub use session::{SessionConfig, SessionError, SessionManager, SessionView};
