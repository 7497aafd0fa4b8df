//! Ledger data models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::game::entities::{Coins, PlayerId};

/// One player's account as stored in the ledger document. Accounts are
/// created lazily with a zero balance on first mutation.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Account {
    pub coins: Coins,
    /// Last calendar date the daily grant was claimed; gates the grant to
    /// at most one success per date.
    #[serde(default)]
    pub last_claimed: Option<NaiveDate>,
}

/// The whole backing document, one entry per player:
/// `{ "<playerId>": { "coins": n, "last_claimed": "YYYY-MM-DD" | null } }`
pub type LedgerDocument = HashMap<PlayerId, Account>;
