//! Session registry: at most one live session per player.
//!
//! The registry debits the wager, deals the session, and hands it to a
//! dedicated actor task. Actions are routed to the actor by player id,
//! so the registry never touches a session's state itself.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, oneshot};

use super::{
    actor::{SessionActor, SessionHandle, SessionMap},
    config::SessionConfig,
    errors::SessionError,
    messages::{SessionMessage, SessionView},
};
use crate::game::{
    entities::{Coins, DeckSource, PlayerId, RandomDeckSource},
    session::GameSession,
};
use crate::ledger::{errors::LedgerError, manager::LedgerManager};

/// Session registry and action router.
pub struct SessionManager {
    ledger: Arc<LedgerManager>,
    config: SessionConfig,
    deck_source: Arc<dyn DeckSource>,
    sessions: SessionMap,
}

impl SessionManager {
    /// Create a registry with the default configuration and a randomly
    /// shuffled deck per session.
    pub fn new(ledger: Arc<LedgerManager>) -> Self {
        Self::with_config(ledger, SessionConfig::default())
    }

    pub fn with_config(ledger: Arc<LedgerManager>, config: SessionConfig) -> Self {
        Self {
            ledger,
            config,
            deck_source: Arc::new(RandomDeckSource),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Replace the deck source. Lets tests and replays force exact deals.
    pub fn with_deck_source(mut self, deck_source: Arc<dyn DeckSource>) -> Self {
        self.deck_source = deck_source;
        self
    }

    /// Start a new session: debit the bet, deal, register, spawn the
    /// actor.
    ///
    /// # Errors
    ///
    /// * `SessionError::InvalidBet` - Zero wager; nothing happens
    /// * `SessionError::InsufficientFunds` - Bet exceeds the balance;
    ///   nothing is debited
    /// * `SessionError::SessionAlreadyActive` - A live session exists
    pub async fn start(
        &self,
        player_id: PlayerId,
        bet: Coins,
    ) -> Result<SessionView, SessionError> {
        if bet == 0 {
            return Err(SessionError::InvalidBet);
        }

        // The debit happens while the registry lock is held so two rapid
        // starts cannot both pass the no-session check.
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&player_id) {
            return Err(SessionError::SessionAlreadyActive);
        }

        match self.ledger.debit(player_id, bet).await {
            Ok(_) => {}
            Err(LedgerError::InsufficientFunds {
                available,
                required,
            }) => {
                return Err(SessionError::InsufficientFunds {
                    available,
                    required,
                });
            }
            Err(e) => return Err(e.into()),
        }

        let deck = self.deck_source.next_deck();
        let session = match GameSession::deal(player_id, bet, deck) {
            Ok(session) => session,
            Err(e) => {
                // The bet is already gone; refund before surfacing the
                // deal failure so no partial mutation is observable.
                if let Err(refund_err) = self.ledger.credit(player_id, bet).await {
                    log::error!(
                        "CRITICAL: failed to refund {bet} to player {player_id} \
                         after a failed deal: {refund_err}",
                    );
                }
                return Err(e.into());
            }
        };

        let view = SessionView::of(&session, None);
        let (actor, handle) = SessionActor::new(
            session,
            self.ledger.clone(),
            self.sessions.clone(),
            self.config.timeout,
        );
        sessions.insert(player_id, handle);
        drop(sessions);

        tokio::spawn(actor.run());

        Ok(view)
    }

    /// Draw one more card.
    pub async fn hit(&self, player_id: PlayerId) -> Result<SessionView, SessionError> {
        self.request(player_id, |response| SessionMessage::Hit {
            player_id,
            response,
        })
        .await
    }

    /// End the player's turn and run the dealer.
    pub async fn stand(&self, player_id: PlayerId) -> Result<SessionView, SessionError> {
        self.request(player_id, |response| SessionMessage::Stand {
            player_id,
            response,
        })
        .await
    }

    /// Snapshot the player's live session.
    pub async fn current(&self, player_id: PlayerId) -> Result<SessionView, SessionError> {
        self.request(player_id, |response| SessionMessage::GetView {
            player_id,
            response,
        })
        .await
    }

    /// Number of live sessions.
    pub async fn active_session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Force-settle every live session. Call before teardown so no
    /// debited bet is left uncredited.
    pub async fn shutdown(&self) {
        let handles: Vec<SessionHandle> = {
            let sessions = self.sessions.read().await;
            sessions.values().cloned().collect()
        };

        for handle in handles {
            let (tx, rx) = oneshot::channel();
            if handle
                .send(SessionMessage::ForceSettle { response: tx })
                .await
                .is_ok()
            {
                let _ = rx.await;
            }
        }

        log::info!("session registry drained");
    }

    /// Route a request through the player's session actor.
    async fn request<F>(&self, player_id: PlayerId, message: F) -> Result<SessionView, SessionError>
    where
        F: FnOnce(oneshot::Sender<Result<SessionView, SessionError>>) -> SessionMessage,
    {
        let handle = {
            let sessions = self.sessions.read().await;
            sessions
                .get(&player_id)
                .cloned()
                .ok_or(SessionError::NoActiveSession)?
        };

        let (tx, rx) = oneshot::channel();
        handle.send(message(tx)).await?;

        // A dropped reply means the session ended while the request was
        // queued.
        rx.await.map_err(|_| SessionError::NoActiveSession)?
    }
}
