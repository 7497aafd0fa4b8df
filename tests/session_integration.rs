//! Integration tests for the session registry.
//!
//! Tests the full start/hit/stand flows against the coin ledger,
//! concurrency guarantees, timeout resolution, and teardown draining
//! using stacked decks for deterministic hands.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use coin_blackjack::game::entities::{Card, Coins, Deck, DeckSource, PlayerId, Suit};
use coin_blackjack::game::settlement::Outcome;
use coin_blackjack::ledger::{LedgerManager, MemoryStore};
use coin_blackjack::session::{SessionConfig, SessionError, SessionManager};

const PLAYER: PlayerId = 101;

/// Deck source handing out pre-stacked decks in order.
struct StackedDeckSource {
    decks: Mutex<VecDeque<Vec<Card>>>,
}

impl StackedDeckSource {
    fn new(decks: Vec<Vec<Card>>) -> Arc<Self> {
        Arc::new(Self {
            decks: Mutex::new(decks.into()),
        })
    }
}

impl DeckSource for StackedDeckSource {
    fn next_deck(&self) -> Deck {
        let cards = self
            .decks
            .lock()
            .expect("deck source lock poisoned")
            .pop_front()
            .expect("test asked for more decks than were stacked");
        Deck::stacked(cards)
    }
}

fn c(value: u8, suit: Suit) -> Card {
    Card(value, suit)
}

/// Deal order: player, player, dealer, dealer, then draws.
fn spades(values: &[u8]) -> Vec<Card> {
    values.iter().map(|&v| c(v, Suit::Spade)).collect()
}

async fn setup(
    balance: Coins,
    decks: Vec<Vec<Card>>,
) -> (Arc<LedgerManager>, SessionManager) {
    setup_with_timeout(balance, decks, Duration::from_secs(120)).await
}

async fn setup_with_timeout(
    balance: Coins,
    decks: Vec<Vec<Card>>,
    timeout: Duration,
) -> (Arc<LedgerManager>, SessionManager) {
    let ledger = Arc::new(LedgerManager::new(Arc::new(MemoryStore::default())));
    if balance > 0 {
        ledger.credit(PLAYER, balance).await.unwrap();
    }
    let sessions = SessionManager::with_config(ledger.clone(), SessionConfig { timeout })
        .with_deck_source(StackedDeckSource::new(decks));
    (ledger, sessions)
}

#[tokio::test]
async fn start_debits_the_bet_and_deals_two_cards_each() {
    let (ledger, sessions) = setup(500, vec![spades(&[10, 5, 9, 8, 2])]).await;

    let view = sessions.start(PLAYER, 100).await.unwrap();

    assert_eq!(ledger.balance(PLAYER).await.unwrap(), 400);
    assert_eq!(view.player_cards.len(), 2);
    assert_eq!(view.dealer_cards.len(), 2);
    assert_eq!(view.dealer_cards[0], None, "hole card must stay hidden");
    assert!(view.dealer_cards[1].is_some());
    assert_eq!(view.dealer_score, None);
    assert!(!view.is_terminal);
    assert_eq!(sessions.active_session_count().await, 1);
}

#[tokio::test]
async fn player_bust_forfeits_the_bet() {
    // Player 10+5, dealer 9+8, hit draws a king: 25, bust.
    let (ledger, sessions) = setup(500, vec![spades(&[10, 5, 9, 8, 13])]).await;

    sessions.start(PLAYER, 100).await.unwrap();
    let view = sessions.hit(PLAYER).await.unwrap();

    assert!(view.is_terminal);
    assert_eq!(view.outcome, Some(Outcome::PlayerBust));
    assert_eq!(view.player_score, 25);
    assert_eq!(view.balance, Some(400));
    assert_eq!(ledger.balance(PLAYER).await.unwrap(), 400);
    assert_eq!(sessions.active_session_count().await, 0);
}

#[tokio::test]
async fn stand_win_credits_twice_the_bet() {
    // Player 13+7 = 20; dealer 9+8 = 17 stands immediately.
    let (ledger, sessions) = setup(500, vec![spades(&[13, 7, 9, 8])]).await;

    sessions.start(PLAYER, 100).await.unwrap();
    let view = sessions.stand(PLAYER).await.unwrap();

    assert!(view.is_terminal);
    assert_eq!(view.outcome, Some(Outcome::PlayerWin));
    assert_eq!(view.dealer_score, Some(17));
    assert_eq!(view.dealer_cards[0], Some(c(9, Suit::Spade)));
    assert_eq!(view.balance, Some(600));
    assert_eq!(ledger.balance(PLAYER).await.unwrap(), 600);
}

#[tokio::test]
async fn push_refunds_the_bet_exactly() {
    // Player 13+9 = 19; dealer 10+9 = 19.
    let deck = vec![
        c(13, Suit::Spade),
        c(9, Suit::Spade),
        c(10, Suit::Heart),
        c(9, Suit::Heart),
    ];
    let (ledger, sessions) = setup(500, vec![deck]).await;

    sessions.start(PLAYER, 100).await.unwrap();
    let view = sessions.stand(PLAYER).await.unwrap();

    assert_eq!(view.outcome, Some(Outcome::Push));
    assert_eq!(ledger.balance(PLAYER).await.unwrap(), 500);
}

#[tokio::test]
async fn settlement_credits_once_no_matter_how_many_hits() {
    // Player 2+3, hits 2, 2, 3 (12), stands; dealer 10+9 = 19 wins.
    let deck = vec![
        c(2, Suit::Spade),
        c(3, Suit::Spade),
        c(10, Suit::Heart),
        c(9, Suit::Heart),
        c(2, Suit::Heart),
        c(2, Suit::Club),
        c(3, Suit::Club),
    ];
    let (ledger, sessions) = setup(500, vec![deck]).await;

    sessions.start(PLAYER, 100).await.unwrap();
    sessions.hit(PLAYER).await.unwrap();
    sessions.hit(PLAYER).await.unwrap();
    sessions.hit(PLAYER).await.unwrap();
    let view = sessions.stand(PLAYER).await.unwrap();

    assert_eq!(view.outcome, Some(Outcome::DealerWin));
    // Debited once at start, no credit on a loss.
    assert_eq!(ledger.balance(PLAYER).await.unwrap(), 400);
}

#[tokio::test]
async fn zero_bet_is_rejected_locally() {
    let (ledger, sessions) = setup(500, vec![]).await;

    let err = sessions.start(PLAYER, 0).await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidBet));
    assert_eq!(ledger.balance(PLAYER).await.unwrap(), 500);
    assert_eq!(sessions.active_session_count().await, 0);
}

#[tokio::test]
async fn bet_beyond_balance_leaves_no_trace() {
    let (ledger, sessions) = setup(50, vec![]).await;

    let err = sessions.start(PLAYER, 100).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::InsufficientFunds {
            available: 50,
            required: 100,
        }
    ));
    assert_eq!(ledger.balance(PLAYER).await.unwrap(), 50);
    assert_eq!(sessions.active_session_count().await, 0);
}

#[tokio::test]
async fn second_start_is_rejected_while_a_session_is_live() {
    let (ledger, sessions) = setup(500, vec![spades(&[10, 5, 9, 8, 2])]).await;

    sessions.start(PLAYER, 100).await.unwrap();
    let err = sessions.start(PLAYER, 100).await.unwrap_err();

    assert!(matches!(err, SessionError::SessionAlreadyActive));
    // The second request debited nothing.
    assert_eq!(ledger.balance(PLAYER).await.unwrap(), 400);
}

#[tokio::test]
async fn a_new_session_can_start_right_after_settlement() {
    let first = spades(&[13, 7, 9, 8]);
    let second = spades(&[10, 5, 6, 8, 2]);
    let (ledger, sessions) = setup(500, vec![first, second]).await;

    sessions.start(PLAYER, 100).await.unwrap();
    let view = sessions.stand(PLAYER).await.unwrap();
    assert!(view.is_terminal);

    // The terminal reply means the registry slot is already free.
    let view = sessions.start(PLAYER, 100).await.unwrap();
    assert!(!view.is_terminal);
    assert_eq!(ledger.balance(PLAYER).await.unwrap(), 500);
}

#[tokio::test]
async fn actions_without_a_session_are_rejected() {
    let (_ledger, sessions) = setup(500, vec![]).await;

    assert!(matches!(
        sessions.hit(PLAYER).await.unwrap_err(),
        SessionError::NoActiveSession
    ));
    assert!(matches!(
        sessions.stand(PLAYER).await.unwrap_err(),
        SessionError::NoActiveSession
    ));
    assert!(matches!(
        sessions.current(PLAYER).await.unwrap_err(),
        SessionError::NoActiveSession
    ));
}

#[tokio::test]
async fn concurrent_hits_each_draw_exactly_one_card() {
    // Player 2+3; both hits stay well under 21.
    let deck = vec![
        c(2, Suit::Spade),
        c(3, Suit::Spade),
        c(13, Suit::Heart),
        c(9, Suit::Heart),
        c(2, Suit::Heart),
        c(3, Suit::Heart),
    ];
    let (_ledger, sessions) = setup(500, vec![deck]).await;

    sessions.start(PLAYER, 100).await.unwrap();
    let (first, second) = tokio::join!(sessions.hit(PLAYER), sessions.hit(PLAYER));

    let first = first.unwrap();
    let second = second.unwrap();

    // Serialized: one response saw three cards, the other four.
    let mut counts = [first.player_cards.len(), second.player_cards.len()];
    counts.sort_unstable();
    assert_eq!(counts, [3, 4]);

    let view = sessions.current(PLAYER).await.unwrap();
    assert_eq!(view.player_cards.len(), 4);
    assert_eq!(view.player_score, 10);
}

#[tokio::test(start_paused = true)]
async fn expired_session_resolves_as_an_implicit_stand() {
    // Player 13+7 = 20; dealer 9+8 = 17. The timeout should settle this
    // as a player win.
    let (ledger, sessions) = setup_with_timeout(
        500,
        vec![spades(&[13, 7, 9, 8])],
        Duration::from_secs(120),
    )
    .await;

    sessions.start(PLAYER, 100).await.unwrap();
    assert_eq!(ledger.balance(PLAYER).await.unwrap(), 400);

    tokio::time::sleep(Duration::from_secs(121)).await;
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }

    assert_eq!(ledger.balance(PLAYER).await.unwrap(), 600);
    assert_eq!(sessions.active_session_count().await, 0);
    assert!(matches!(
        sessions.hit(PLAYER).await.unwrap_err(),
        SessionError::NoActiveSession
    ));
}

#[tokio::test]
async fn shutdown_drains_open_sessions() {
    let (ledger, sessions) = setup(500, vec![spades(&[13, 7, 9, 8])]).await;

    sessions.start(PLAYER, 100).await.unwrap();
    sessions.shutdown().await;

    // The open session was force-settled as a stand: player 20 beats 17.
    assert_eq!(ledger.balance(PLAYER).await.unwrap(), 600);
    assert_eq!(sessions.active_session_count().await, 0);
}

#[tokio::test]
async fn current_view_keeps_the_dealer_masked() {
    let (_ledger, sessions) = setup(500, vec![spades(&[10, 5, 9, 8, 2])]).await;

    sessions.start(PLAYER, 100).await.unwrap();
    let view = sessions.current(PLAYER).await.unwrap();

    assert_eq!(view.dealer_cards[0], None);
    assert_eq!(view.dealer_score, None);
    assert!(!view.is_terminal);
    assert_eq!(view.balance, None);
}
