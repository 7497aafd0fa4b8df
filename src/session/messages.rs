//! Session actor message types.

use serde::Serialize;
use tokio::sync::oneshot;
use uuid::Uuid;

use super::errors::SessionError;
use crate::game::entities::{Card, Coins, PlayerId};
use crate::game::session::GameSession;
use crate::game::settlement::Outcome;

/// Messages that can be sent to a session actor.
#[derive(Debug)]
pub enum SessionMessage {
    /// Draw one more card.
    Hit {
        player_id: PlayerId,
        response: oneshot::Sender<Result<SessionView, SessionError>>,
    },

    /// End the player's turn and run the dealer.
    Stand {
        player_id: PlayerId,
        response: oneshot::Sender<Result<SessionView, SessionError>>,
    },

    /// Snapshot of the current state, for re-rendering.
    GetView {
        player_id: PlayerId,
        response: oneshot::Sender<Result<SessionView, SessionError>>,
    },

    /// Force-resolve an open session as an implicit stand (teardown drain).
    ForceSettle { response: oneshot::Sender<()> },
}

/// Player-facing snapshot of a session. The dealer's first card and total
/// stay hidden until the session is terminal.
#[derive(Clone, Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub player_id: PlayerId,
    pub bet: Coins,

    pub player_cards: Vec<Card>,
    pub player_score: u8,

    /// Ordered dealer cards; `None` marks a face-down card.
    pub dealer_cards: Vec<Option<Card>>,
    /// Dealer score, revealed only once terminal.
    pub dealer_score: Option<u8>,

    pub is_terminal: bool,
    /// Set once terminal.
    pub outcome: Option<Outcome>,
    /// Balance after settlement; set once terminal, when the ledger
    /// read/credit succeeded.
    pub balance: Option<Coins>,
}

impl SessionView {
    /// Snapshot a session, masking the dealer's hole card until the
    /// session is terminal.
    pub(crate) fn of(session: &GameSession, balance: Option<Coins>) -> Self {
        let terminal = session.is_terminal();
        let dealer_cards = session
            .dealer_hand()
            .cards()
            .iter()
            .enumerate()
            .map(|(i, &card)| {
                if i == 0 && !terminal {
                    None
                } else {
                    Some(card)
                }
            })
            .collect();

        Self {
            session_id: session.id(),
            player_id: session.player_id(),
            bet: session.bet(),
            player_cards: session.player_hand().cards().to_vec(),
            player_score: session.player_hand().score(),
            dealer_cards,
            dealer_score: terminal.then(|| session.dealer_hand().score()),
            is_terminal: terminal,
            outcome: session.settlement().map(|settlement| settlement.outcome),
            balance,
        }
    }
}
