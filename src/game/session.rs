//! Single-round blackjack state machine.
//!
//! A session binds one deck, one wager, and two hands to one player. The
//! player's bet is debited before the session exists; the session's only
//! job is to run the turn sequence and report the settlement exactly once.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    entities::{Coins, Deck, Hand, PlayerId},
    errors::GameError,
    settlement::Settlement,
};

/// The dealer draws until reaching this score, then stops (even past 21).
pub const DEALER_STAND_SCORE: u8 = 17;

/// Session phases. A player bust (or a hit to exactly 21) jumps straight
/// from `AwaitingPlayerAction` to `Settled` without a dealer turn.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    AwaitingPlayerAction,
    DealerTurn,
    Settled,
}

/// Result of a player action on an open session.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Turn {
    /// The session stays open for further actions.
    Open,
    /// The session reached its terminal state.
    Settled(Settlement),
}

/// One in-progress game bound to one player and one wager.
#[derive(Debug)]
pub struct GameSession {
    id: Uuid,
    player_id: PlayerId,
    bet: Coins,
    deck: Deck,
    player_hand: Hand,
    dealer_hand: Hand,
    state: SessionState,
    settlement: Option<Settlement>,
    created_at: DateTime<Utc>,
}

impl GameSession {
    /// Deal the opening hands: two cards to the player, then two to the
    /// dealer. The caller must have debited `bet` already.
    pub fn deal(player_id: PlayerId, bet: Coins, mut deck: Deck) -> Result<Self, GameError> {
        let mut player_hand = Hand::default();
        let mut dealer_hand = Hand::default();
        player_hand.push(deck.draw()?);
        player_hand.push(deck.draw()?);
        dealer_hand.push(deck.draw()?);
        dealer_hand.push(deck.draw()?);
        Ok(Self {
            id: Uuid::new_v4(),
            player_id,
            bet,
            deck,
            player_hand,
            dealer_hand,
            state: SessionState::AwaitingPlayerAction,
            settlement: None,
            created_at: Utc::now(),
        })
    }

    /// Draw one card into the player's hand. A resulting score of 21 or
    /// more ends the player's turn immediately; the dealer does not draw.
    pub fn hit(&mut self, actor: PlayerId) -> Result<Turn, GameError> {
        self.authorize(actor)?;
        self.ensure_awaiting()?;
        self.player_hand.push(self.deck.draw()?);
        if self.player_hand.score() >= 21 {
            Ok(Turn::Settled(self.settle()))
        } else {
            Ok(Turn::Open)
        }
    }

    /// End the player's turn: run the dealer to completion, then settle.
    pub fn stand(&mut self, actor: PlayerId) -> Result<Turn, GameError> {
        self.authorize(actor)?;
        self.ensure_awaiting()?;
        self.run_dealer()?;
        Ok(Turn::Settled(self.settle()))
    }

    /// Resolve an open session as an implicit stand. Used by the timeout
    /// and teardown paths so the wager always settles. Returns `None` if
    /// the session is already settled.
    pub fn resolve(&mut self) -> Result<Option<Settlement>, GameError> {
        if self.state == SessionState::Settled {
            return Ok(None);
        }
        self.run_dealer()?;
        Ok(Some(self.settle()))
    }

    fn authorize(&self, actor: PlayerId) -> Result<(), GameError> {
        if actor != self.player_id {
            return Err(GameError::NotAuthorized);
        }
        Ok(())
    }

    fn ensure_awaiting(&self) -> Result<(), GameError> {
        if self.state != SessionState::AwaitingPlayerAction {
            return Err(GameError::InvalidState);
        }
        Ok(())
    }

    fn run_dealer(&mut self) -> Result<(), GameError> {
        self.state = SessionState::DealerTurn;
        while self.dealer_hand.score() < DEALER_STAND_SCORE {
            self.dealer_hand.push(self.deck.draw()?);
        }
        Ok(())
    }

    fn settle(&mut self) -> Settlement {
        self.state = SessionState::Settled;
        let settlement = Settlement::from_scores(
            self.player_hand.score(),
            self.dealer_hand.score(),
            self.bet,
        );
        self.settlement = Some(settlement);
        settlement
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn bet(&self) -> Coins {
        self.bet
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state == SessionState::Settled
    }

    pub fn player_hand(&self) -> &Hand {
        &self.player_hand
    }

    pub fn dealer_hand(&self) -> &Hand {
        &self.dealer_hand
    }

    pub fn settlement(&self) -> Option<Settlement> {
        self.settlement
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
