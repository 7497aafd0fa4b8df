//! Outcome and payout rules for a finished round.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::Coins;

/// How a settled round ended for the player.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Outcome {
    /// The player went over 21.
    PlayerBust,
    /// The dealer went over 21.
    DealerBust,
    /// The player's score beat the dealer's.
    PlayerWin,
    /// The dealer's score beat the player's.
    DealerWin,
    /// Equal scores; the wager is refunded.
    Push,
}

impl Outcome {
    /// Whether the player's wager came back (win or refund).
    pub fn is_player_win(self) -> bool {
        matches!(self, Self::DealerBust | Self::PlayerWin)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::PlayerBust => "player bust",
            Self::DealerBust => "dealer bust",
            Self::PlayerWin => "player wins",
            Self::DealerWin => "dealer wins",
            Self::Push => "push",
        };
        write!(f, "{repr}")
    }
}

/// The terminal result of a session: the outcome and the coins owed back
/// to the player. The bet was debited at session start, so a loss pays
/// nothing, a win pays twice the bet, and a push refunds the bet.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Settlement {
    pub outcome: Outcome,
    pub payout: Coins,
}

impl Settlement {
    /// Apply the outcome rules in order: player bust, dealer bust, higher
    /// score wins, equal scores push.
    pub fn from_scores(player: u8, dealer: u8, bet: Coins) -> Self {
        let (outcome, payout) = if player > 21 {
            (Outcome::PlayerBust, 0)
        } else if dealer > 21 {
            (Outcome::DealerBust, bet.saturating_mul(2))
        } else if player > dealer {
            (Outcome::PlayerWin, bet.saturating_mul(2))
        } else if dealer > player {
            (Outcome::DealerWin, 0)
        } else {
            (Outcome::Push, bet)
        };
        Self { outcome, payout }
    }
}
