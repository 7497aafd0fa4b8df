//! Coin ledger with a single-writer lock over the backing document.
//!
//! The store is one shared document, so every operation is a
//! load-modify-save serialized behind one lock. That makes each
//! debit/credit an atomic read-modify-write keyed by player id and keeps
//! balances from being corrupted by overlapping session actions.

use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{
    errors::{LedgerError, LedgerResult},
    store::LedgerStore,
};
use crate::game::entities::{Coins, PlayerId};

/// Coins granted by a daily claim when no override is configured.
pub const DEFAULT_DAILY_GRANT: Coins = 1000;

/// Ledger manager: balances, atomic debit/credit, and the once-per-day
/// grant.
pub struct LedgerManager {
    store: Arc<dyn LedgerStore>,
    /// Serializes all access to the backing document.
    write_lock: Mutex<()>,
    daily_grant: Coins,
}

impl LedgerManager {
    /// Create a new ledger manager over a backing store.
    ///
    /// The daily grant amount defaults to 1000 coins and can be overridden
    /// with the `DAILY_GRANT_AMOUNT` environment variable.
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        let daily_grant = std::env::var("DAILY_GRANT_AMOUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_DAILY_GRANT);

        Self {
            store,
            write_lock: Mutex::new(()),
            daily_grant,
        }
    }

    /// Current balance for a player. An account that was never touched
    /// reads as zero without being created.
    pub async fn balance(&self, player_id: PlayerId) -> LedgerResult<Coins> {
        let _guard = self.write_lock.lock().await;
        let doc = self.store.load().await?;
        Ok(doc.get(&player_id).map_or(0, |account| account.coins))
    }

    /// Atomically remove `amount` coins from a player's balance.
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - Zero amount
    /// * `LedgerError::InsufficientFunds` - Balance below `amount`; no
    ///   debit occurs
    pub async fn debit(&self, player_id: PlayerId, amount: Coins) -> LedgerResult<Coins> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let _guard = self.write_lock.lock().await;
        let mut doc = self.store.load().await?;
        let available = doc.get(&player_id).map_or(0, |account| account.coins);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                available,
                required: amount,
            });
        }

        let account = doc.entry(player_id).or_default();
        account.coins = available - amount;
        let new_balance = account.coins;
        self.store.save(&doc).await?;

        Ok(new_balance)
    }

    /// Atomically add `amount` coins to a player's balance, creating the
    /// account if needed.
    pub async fn credit(&self, player_id: PlayerId, amount: Coins) -> LedgerResult<Coins> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let _guard = self.write_lock.lock().await;
        let mut doc = self.store.load().await?;
        let account = doc.entry(player_id).or_default();
        account.coins = account
            .coins
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;
        let new_balance = account.coins;
        self.store.save(&doc).await?;

        Ok(new_balance)
    }

    /// Claim the daily grant for `today`. Succeeds at most once per
    /// calendar date per player.
    ///
    /// # Errors
    ///
    /// * `LedgerError::AlreadyClaimedToday` - `last_claimed` is `today`
    ///   or later; the balance is unchanged
    pub async fn claim_daily(&self, player_id: PlayerId, today: NaiveDate) -> LedgerResult<Coins> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.store.load().await?;
        let account = doc.entry(player_id).or_default();

        if let Some(last_claimed) = account.last_claimed
            && last_claimed >= today
        {
            return Err(LedgerError::AlreadyClaimedToday(last_claimed));
        }

        account.coins = account
            .coins
            .checked_add(self.daily_grant)
            .ok_or(LedgerError::BalanceOverflow)?;
        account.last_claimed = Some(today);
        let new_balance = account.coins;
        self.store.save(&doc).await?;

        log::debug!("player {player_id} claimed the daily grant of {}", self.daily_grant);

        Ok(new_balance)
    }

    /// The configured daily grant amount.
    pub fn daily_grant(&self) -> Coins {
        self.daily_grant
    }
}
