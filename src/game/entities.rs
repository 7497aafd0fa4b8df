use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::GameError;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
    // Wild is used to initialize a deck of cards.
    Wild,
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
            Self::Wild => "w",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values.
pub type Value = u8;

/// A card is a tuple of a uInt8 value (ace=1u8, jack=11u8, queen=12u8,
/// king=13u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl Card {
    /// Blackjack face value. Aces count as 11 here; scoring reduces them
    /// to 1 as needed.
    pub(crate) const fn face_value(self) -> u8 {
        match self.0 {
            1 => 11,
            11..=13 => 10,
            v => v,
        }
    }

    const fn is_ace(self) -> bool {
        self.0 == 1
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            1 => "A",
            11 => "J",
            12 => "Q",
            13 => "K",
            v => &v.to_string(),
        };
        write!(f, "{value}{}", self.1)
    }
}

/// A full deck of cards, dealt from the front and never reshuffled while
/// a session owns it.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    deck_idx: usize,
}

impl Deck {
    /// Build the 52 distinct rank×suit cards and shuffle them with the
    /// given generator.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cards = vec![Card(0, Suit::Wild); 52];
        for (i, value) in (1u8..=13u8).enumerate() {
            for (j, suit) in [Suit::Club, Suit::Spade, Suit::Diamond, Suit::Heart]
                .into_iter()
                .enumerate()
            {
                cards[4 * i + j] = Card(value, suit);
            }
        }
        cards.shuffle(rng);
        Self { cards, deck_idx: 0 }
    }

    /// A deck with a fixed deal order, front card dealt first. Lets tests
    /// and replays force exact hands.
    pub fn stacked(cards: Vec<Card>) -> Self {
        Self { cards, deck_idx: 0 }
    }

    /// Remove and return the front card.
    pub fn draw(&mut self) -> Result<Card, GameError> {
        let card = self
            .cards
            .get(self.deck_idx)
            .copied()
            .ok_or(GameError::DeckExhausted)?;
        self.deck_idx += 1;
        Ok(card)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.deck_idx
    }
}

/// Source of shuffled decks for new sessions. Injectable so tests can
/// stack decks and assert deterministic hands.
pub trait DeckSource: Send + Sync {
    fn next_deck(&self) -> Deck;
}

/// Shuffles each deck with the thread-local generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomDeckSource;

impl DeckSource for RandomDeckSource {
    fn next_deck(&self) -> Deck {
        Deck::shuffled(&mut rand::rng())
    }
}

/// An ordered set of cards held by the player or the dealer. Append-only
/// while a session is live.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Score the hand. Face cards count 10, aces start at 11; while the
    /// total is over 21 and an unreduced ace remains, one ace drops to 1.
    /// A result over 21 is a bust.
    pub fn score(&self) -> u8 {
        let mut value: u8 = 0;
        let mut aces: u8 = 0;
        for card in &self.cards {
            if card.is_ace() {
                aces += 1;
            }
            value = value.saturating_add(card.face_value());
        }
        while value > 21 && aces > 0 {
            value -= 10;
            aces -= 1;
        }
        value
    }

    pub fn is_bust(&self) -> bool {
        self.score() > 21
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = self
            .cards
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "{repr}")
    }
}

/// Type alias for whole coins. All bets and balances are whole coins;
/// there are no fractional wagers.
pub type Coins = u64;

/// Type alias for chat-platform user ids (snowflakes).
pub type PlayerId = u64;
