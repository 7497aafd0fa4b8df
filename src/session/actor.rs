//! Session actor: serializes all actions against one game session.
//!
//! Each live session is owned by exactly one tokio task. Player actions
//! arrive through the actor's inbox and are processed one at a time,
//! including any ledger write they trigger, so two rapid presses can
//! never interleave against the same hand.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::{
    sync::{RwLock, mpsc},
    time::{Instant, sleep_until},
};
use uuid::Uuid;

use super::{
    errors::SessionError,
    messages::{SessionMessage, SessionView},
};
use crate::game::{
    entities::{Coins, PlayerId},
    errors::GameError,
    session::{GameSession, Turn},
    settlement::Settlement,
};
use crate::ledger::manager::LedgerManager;

/// Live sessions keyed by owner, shared between the registry and its
/// actors.
pub(super) type SessionMap = Arc<RwLock<HashMap<PlayerId, SessionHandle>>>;

const MAILBOX_CAPACITY: usize = 16;

/// Handle for sending messages to a session actor.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
    session_id: Uuid,
}

impl SessionHandle {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Send a message to the session. A closed inbox means the session
    /// already ended.
    pub(super) async fn send(&self, message: SessionMessage) -> Result<(), SessionError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SessionError::NoActiveSession)
    }
}

/// Actor owning one game session for its whole lifetime.
pub(super) struct SessionActor {
    session: GameSession,
    inbox: mpsc::Receiver<SessionMessage>,
    ledger: Arc<LedgerManager>,
    sessions: SessionMap,
    deadline: Instant,
}

impl SessionActor {
    pub(super) fn new(
        session: GameSession,
        ledger: Arc<LedgerManager>,
        sessions: SessionMap,
        timeout: std::time::Duration,
    ) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(MAILBOX_CAPACITY);
        let handle = SessionHandle {
            sender,
            session_id: session.id(),
        };
        let actor = Self {
            session,
            inbox,
            ledger,
            sessions,
            deadline: Instant::now() + timeout,
        };
        (actor, handle)
    }

    /// Run the session event loop until the session settles.
    pub(super) async fn run(mut self) {
        log::info!(
            "session {} for player {} started (bet {})",
            self.session.id(),
            self.session.player_id(),
            self.session.bet(),
        );

        loop {
            tokio::select! {
                maybe_message = self.inbox.recv() => match maybe_message {
                    Some(message) => {
                        self.handle_message(message).await;
                        if self.session.is_terminal() {
                            break;
                        }
                    }
                    // Every handle is gone; resolve rather than leak the bet.
                    None => {
                        self.expire("registry dropped").await;
                        break;
                    }
                },

                _ = sleep_until(self.deadline) => {
                    self.expire("timed out").await;
                    break;
                }
            }
        }

        self.unregister().await;
        self.drain_inbox();

        log::info!("session {} closed", self.session.id());
    }

    async fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Hit {
                player_id,
                response,
            } => {
                let result = self.session.hit(player_id);
                let reply = self.conclude(result).await;
                let _ = response.send(reply);
            }

            SessionMessage::Stand {
                player_id,
                response,
            } => {
                let result = self.session.stand(player_id);
                let reply = self.conclude(result).await;
                let _ = response.send(reply);
            }

            SessionMessage::GetView {
                player_id,
                response,
            } => {
                let reply = if player_id == self.session.player_id() {
                    Ok(SessionView::of(&self.session, None))
                } else {
                    Err(GameError::NotAuthorized.into())
                };
                let _ = response.send(reply);
            }

            SessionMessage::ForceSettle { response } => {
                self.expire("force-settled").await;
                // Unregister before acking so the drain caller observes an
                // empty registry.
                self.unregister().await;
                let _ = response.send(());
            }
        }
    }

    /// Turn a transition result into a reply, applying the settlement and
    /// unregistering first when the session just ended.
    async fn conclude(
        &mut self,
        result: Result<Turn, GameError>,
    ) -> Result<SessionView, SessionError> {
        match result {
            Ok(Turn::Open) => Ok(SessionView::of(&self.session, None)),
            Ok(Turn::Settled(settlement)) => {
                let balance = self.apply_settlement(settlement).await;
                // Unregister before replying so the player can start a new
                // game the moment they see the terminal view.
                self.unregister().await;
                Ok(SessionView::of(&self.session, balance))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Credit the payout (or just read the balance on a loss). Called
    /// exactly once per session: the state machine only ever produces one
    /// settlement.
    async fn apply_settlement(&self, settlement: Settlement) -> Option<Coins> {
        let player_id = self.session.player_id();
        let result = if settlement.payout > 0 {
            self.ledger.credit(player_id, settlement.payout).await
        } else {
            self.ledger.balance(player_id).await
        };
        match result {
            Ok(balance) => Some(balance),
            Err(e) => {
                log::error!(
                    "CRITICAL: session {}: ledger update failed after settlement \
                     ({}, payout {}): {e}",
                    self.session.id(),
                    settlement.outcome,
                    settlement.payout,
                );
                None
            }
        }
    }

    /// Resolve an open session as an implicit stand.
    async fn expire(&mut self, reason: &str) {
        match self.session.resolve() {
            Ok(Some(settlement)) => {
                log::info!(
                    "session {} {reason}, resolved as stand ({})",
                    self.session.id(),
                    settlement.outcome,
                );
                self.apply_settlement(settlement).await;
            }
            Ok(None) => {}
            Err(e) => {
                log::error!(
                    "session {} {reason} but could not be resolved: {e}",
                    self.session.id(),
                );
            }
        }
    }

    async fn unregister(&self) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&self.session.player_id());
    }

    /// Answer anything still queued after the session ended.
    fn drain_inbox(&mut self) {
        self.inbox.close();
        while let Ok(message) = self.inbox.try_recv() {
            match message {
                SessionMessage::Hit { response, .. }
                | SessionMessage::Stand { response, .. }
                | SessionMessage::GetView { response, .. } => {
                    let _ = response.send(Err(GameError::InvalidState.into()));
                }
                SessionMessage::ForceSettle { response } => {
                    let _ = response.send(());
                }
            }
        }
    }
}
