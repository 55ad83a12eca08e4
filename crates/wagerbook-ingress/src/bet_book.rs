//! Bet book — the index of bets by id and by market.
//!
//! Placement inserts; settlement drains. Bets are never deleted: terminal
//! bets stay queryable for reporting, they just stop appearing in the
//! open-bet view.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use wagerbook_types::{Bet, BetId, BetStatus, MarketId, Result, WagerbookError};

#[derive(Default)]
struct Inner {
    bets: HashMap<BetId, Bet>,
    by_market: HashMap<MarketId, Vec<BetId>>,
}

/// Shared index of all bets.
pub struct BetBook {
    inner: RwLock<Inner>,
}

impl BetBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Record a freshly placed bet.
    pub fn insert(&self, bet: Bet) {
        let mut inner = self.inner.write();
        inner
            .by_market
            .entry(bet.market_id)
            .or_default()
            .push(bet.id);
        inner.bets.insert(bet.id, bet);
    }

    /// Look up one bet.
    #[must_use]
    pub fn get(&self, bet_id: BetId) -> Option<Bet> {
        self.inner.read().bets.get(&bet_id).cloned()
    }

    /// All bets on a market still in PLACED state, in placement order.
    #[must_use]
    pub fn open_bets_for(&self, market_id: MarketId) -> Vec<Bet> {
        let inner = self.inner.read();
        inner
            .by_market
            .get(&market_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.bets.get(id))
                    .filter(|bet| bet.status == BetStatus::Placed)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Move a bet into a terminal state.
    ///
    /// # Errors
    /// - `BetNotFound` if the id does not resolve.
    /// - `BetNotOpen` if the bet is already terminal (terminal states
    ///   never re-transition).
    pub fn mark_resolved(
        &self,
        bet_id: BetId,
        status: BetStatus,
        settled_at: DateTime<Utc>,
    ) -> Result<Bet> {
        let mut inner = self.inner.write();
        let bet = inner
            .bets
            .get_mut(&bet_id)
            .ok_or(WagerbookError::BetNotFound(bet_id))?;
        if !bet.status.can_transition_to(status) {
            return Err(WagerbookError::BetNotOpen {
                bet_id,
                status: bet.status,
            });
        }
        bet.status = status;
        bet.settled_at = Some(settled_at);
        Ok(bet.clone())
    }

    /// Number of bets ever recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().bets.len()
    }

    /// Whether the book has no bets at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().bets.is_empty()
    }
}

impl Default for BetBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use wagerbook_types::UserId;

    use super::*;

    fn placed_bet(market_id: MarketId) -> Bet {
        Bet::dummy_for_user(
            UserId::new(),
            market_id,
            Decimal::new(50, 0),
            Decimal::new(20, 1),
        )
    }

    #[test]
    fn insert_and_get() {
        let book = BetBook::new();
        let bet = placed_bet(MarketId::new());
        book.insert(bet.clone());
        assert_eq!(book.get(bet.id).unwrap().id, bet.id);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn open_bets_preserve_placement_order() {
        let book = BetBook::new();
        let market = MarketId::new();
        let first = placed_bet(market);
        let second = placed_bet(market);
        book.insert(first.clone());
        book.insert(second.clone());

        let open = book.open_bets_for(market);
        assert_eq!(open.len(), 2);
        assert_eq!(open[0].id, first.id);
        assert_eq!(open[1].id, second.id);
    }

    #[test]
    fn resolved_bets_leave_open_view() {
        let book = BetBook::new();
        let market = MarketId::new();
        let bet = placed_bet(market);
        book.insert(bet.clone());

        book.mark_resolved(bet.id, BetStatus::SettledWon, Utc::now())
            .unwrap();
        assert!(book.open_bets_for(market).is_empty());
        // Still queryable by id.
        assert_eq!(book.get(bet.id).unwrap().status, BetStatus::SettledWon);
    }

    #[test]
    fn terminal_bet_cannot_retransition() {
        let book = BetBook::new();
        let bet = placed_bet(MarketId::new());
        book.insert(bet.clone());
        book.mark_resolved(bet.id, BetStatus::SettledLost, Utc::now())
            .unwrap();

        let err = book
            .mark_resolved(bet.id, BetStatus::SettledWon, Utc::now())
            .unwrap_err();
        assert!(matches!(err, WagerbookError::BetNotOpen { .. }));
    }

    #[test]
    fn unknown_bet_errors() {
        let book = BetBook::new();
        let err = book
            .mark_resolved(BetId::new(), BetStatus::Voided, Utc::now())
            .unwrap_err();
        assert!(matches!(err, WagerbookError::BetNotFound(_)));
    }

    #[test]
    fn markets_are_independent() {
        let book = BetBook::new();
        let m1 = MarketId::new();
        let m2 = MarketId::new();
        book.insert(placed_bet(m1));
        book.insert(placed_bet(m1));
        book.insert(placed_bet(m2));
        assert_eq!(book.open_bets_for(m1).len(), 2);
        assert_eq!(book.open_bets_for(m2).len(), 1);
        assert!(book.open_bets_for(MarketId::new()).is_empty());
    }
}
