//! Bet placement service — the only write path into a new bet.
//!
//! ## Placement Flow
//!
//! ```text
//! request → market gate (fresh state read)
//!         → stake/odds validation
//!         → balance precheck (optional)
//!         → ExposureTracker.reserve        ← the race-free limit check
//!         → LedgerStore.append BET_PLACED  ← stake committed
//!         → BetBook.insert (PLACED)
//! ```
//!
//! If anything fails after the reservation but before the ledger write
//! lands, the reservation is released again (compensating action), so
//! exposure never sticks above true liability. Once the ledger write
//! commits, the bet exists; from then on only the settlement plane's void
//! path can unwind it.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use wagerbook_ledger::LedgerStore;
use wagerbook_types::{
    Bet, BetCategory, BetId, BetSide, BetStatus, EngineConfig, LedgerCategory, MarketId,
    MarketState, Result, Selection, UserId, WagerbookError, constants, money::round_money,
};

use crate::{BetBook, ExposureTracker, MarketDirectory};

/// A bet placement command, as delivered by the API collaborator.
#[derive(Debug, Clone)]
pub struct PlaceBetRequest {
    pub user_id: UserId,
    pub market_id: MarketId,
    pub selection: Selection,
    pub side: BetSide,
    pub category: BetCategory,
    pub stake: Decimal,
    pub odds: Decimal,
}

/// Orchestrates validation, exposure reservation, and the first ledger
/// write for a new bet.
pub struct BetPlacementService {
    ledger: Arc<LedgerStore>,
    exposure: Arc<ExposureTracker>,
    markets: Arc<MarketDirectory>,
    book: Arc<BetBook>,
    config: EngineConfig,
}

impl BetPlacementService {
    #[must_use]
    pub fn new(
        ledger: Arc<LedgerStore>,
        exposure: Arc<ExposureTracker>,
        markets: Arc<MarketDirectory>,
        book: Arc<BetBook>,
        config: EngineConfig,
    ) -> Self {
        Self {
            ledger,
            exposure,
            markets,
            book,
            config,
        }
    }

    /// Place a bet.
    ///
    /// # Errors
    /// - `MarketClosed` / `MarketSuspended` if the market isn't accepting bets.
    /// - `InvalidStake` / `InvalidOdds` on malformed amounts.
    /// - `InsufficientBalance` when the precheck is enabled and fails.
    /// - `ExposureLimitExceeded` if the reservation doesn't fit.
    pub fn place(&self, request: &PlaceBetRequest) -> Result<Bet> {
        // 1. Market gate. The state read goes through the same lock every
        //    suspension write goes through — never stale.
        match self.markets.state_of(request.market_id)? {
            MarketState::Open => {}
            MarketState::Suspended => {
                return Err(WagerbookError::MarketSuspended(request.market_id));
            }
            state @ (MarketState::Settled | MarketState::Voided) => {
                return Err(WagerbookError::MarketClosed {
                    market_id: request.market_id,
                    state,
                });
            }
        }

        // 2. Amount validation.
        let stake = round_money(request.stake);
        if stake <= Decimal::ZERO {
            return Err(WagerbookError::InvalidStake { stake });
        }
        let min_odds = Decimal::new(constants::MIN_ODDS_NUMERATOR, constants::MIN_ODDS_SCALE);
        if request.odds < min_odds {
            return Err(WagerbookError::InvalidOdds {
                odds: request.odds,
                minimum: min_odds,
            });
        }

        let liability = match request.side {
            BetSide::Back => round_money(stake * (request.odds - Decimal::ONE)),
            BetSide::Lay => stake,
        };

        // 3. Balance precheck (credit-only books run with this off).
        if self.config.precheck_balance {
            let available = self.ledger.balance_of(request.user_id);
            if available < stake {
                return Err(WagerbookError::InsufficientBalance {
                    needed: stake,
                    available,
                });
            }
        }

        // 4. Reserve exposure. This is the serialized, race-free limit check.
        let reservation_id =
            self.exposure
                .reserve(request.user_id, request.market_id, liability)?;

        // 5. Commit the stake. If the write fails, compensate: release the
        //    reservation so exposure reflects true liability again.
        let bet_id = BetId::new();
        let remark = format!("{} {} @ {}", request.side, request.selection, request.odds);
        if let Err(err) = self.ledger.append(
            request.user_id,
            LedgerCategory::BetPlaced,
            Decimal::ZERO,
            stake,
            Some(bet_id),
            &remark,
        ) {
            let _ = self.exposure.release(reservation_id);
            return Err(err);
        }

        // 6. Persist the bet.
        let bet = Bet {
            id: bet_id,
            user_id: request.user_id,
            market_id: request.market_id,
            selection: request.selection.clone(),
            side: request.side,
            category: request.category,
            stake,
            odds: request.odds,
            status: BetStatus::Placed,
            reservation_id,
            created_at: Utc::now(),
            settled_at: None,
        };
        self.book.insert(bet.clone());

        tracing::debug!(
            bet = %bet.id,
            user = %bet.user_id,
            market = %bet.market_id,
            stake = %bet.stake,
            odds = %bet.odds,
            liability = %liability,
            "Bet placed"
        );
        Ok(bet)
    }
}

#[cfg(test)]
mod tests {
    use wagerbook_ledger::HistoryRange;

    use super::*;

    struct Fixture {
        service: BetPlacementService,
        ledger: Arc<LedgerStore>,
        exposure: Arc<ExposureTracker>,
        markets: Arc<MarketDirectory>,
        book: Arc<BetBook>,
        user: UserId,
        market: MarketId,
    }

    fn fixture() -> Fixture {
        fixture_with(EngineConfig::default())
    }

    fn fixture_with(config: EngineConfig) -> Fixture {
        let ledger = Arc::new(LedgerStore::new());
        let exposure = Arc::new(ExposureTracker::new());
        let markets = Arc::new(MarketDirectory::new());
        let book = Arc::new(BetBook::new());
        let service = BetPlacementService::new(
            Arc::clone(&ledger),
            Arc::clone(&exposure),
            Arc::clone(&markets),
            Arc::clone(&book),
            config,
        );

        let user = UserId::new();
        let market = MarketId::new();
        markets.create(market, "Match Odds").unwrap();
        exposure.set_credit_limit(user, Decimal::new(1000, 0));
        ledger
            .append(
                user,
                LedgerCategory::Deposit,
                Decimal::new(1000, 0),
                Decimal::ZERO,
                None,
                "seed",
            )
            .unwrap();

        Fixture {
            service,
            ledger,
            exposure,
            markets,
            book,
            user,
            market,
        }
    }

    fn request(fx: &Fixture, stake: Decimal, odds: Decimal) -> PlaceBetRequest {
        PlaceBetRequest {
            user_id: fx.user,
            market_id: fx.market,
            selection: "WIN".to_string(),
            side: BetSide::Back,
            category: BetCategory::Sports,
            stake,
            odds,
        }
    }

    #[test]
    fn placement_debits_stake_and_reserves_exposure() {
        let fx = fixture();
        let bet = fx
            .service
            .place(&request(&fx, Decimal::new(100, 0), Decimal::new(20, 1)))
            .unwrap();

        assert_eq!(bet.status, BetStatus::Placed);
        // Stake debited.
        assert_eq!(fx.ledger.balance_of(fx.user), Decimal::new(900, 0));
        // Liability reserved: 100 × (2.0 − 1).
        assert_eq!(fx.exposure.exposure_of(fx.user), Decimal::new(10000, 2));
        // Bet is in the open book, entry tagged with its id.
        assert_eq!(fx.book.open_bets_for(fx.market).len(), 1);
        let entries = fx.ledger.entries_for_bet(bet.id);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, LedgerCategory::BetPlaced);
        assert_eq!(entries[0].debit, Decimal::new(100, 0));
    }

    #[test]
    fn zero_stake_rejected() {
        let fx = fixture();
        let err = fx
            .service
            .place(&request(&fx, Decimal::ZERO, Decimal::new(20, 1)))
            .unwrap_err();
        assert!(matches!(err, WagerbookError::InvalidStake { .. }));
        assert_eq!(fx.ledger.balance_of(fx.user), Decimal::new(1000, 0));
    }

    #[test]
    fn odds_below_minimum_rejected() {
        let fx = fixture();
        let err = fx
            .service
            .place(&request(&fx, Decimal::new(10, 0), Decimal::ONE))
            .unwrap_err();
        assert!(matches!(err, WagerbookError::InvalidOdds { .. }));
    }

    #[test]
    fn suspended_market_rejects_placement() {
        let fx = fixture();
        fx.markets.suspend(fx.market).unwrap();
        let err = fx
            .service
            .place(&request(&fx, Decimal::new(10, 0), Decimal::new(20, 1)))
            .unwrap_err();
        assert!(matches!(err, WagerbookError::MarketSuspended(_)));

        // Reopening lets the same request through.
        fx.markets.reopen(fx.market).unwrap();
        fx.service
            .place(&request(&fx, Decimal::new(10, 0), Decimal::new(20, 1)))
            .unwrap();
    }

    #[test]
    fn settled_market_rejects_placement() {
        let fx = fixture();
        fx.markets.mark_settled(fx.market, "WIN").unwrap();
        let err = fx
            .service
            .place(&request(&fx, Decimal::new(10, 0), Decimal::new(20, 1)))
            .unwrap_err();
        assert!(matches!(err, WagerbookError::MarketClosed { .. }));
    }

    #[test]
    fn exposure_limit_enforced() {
        let fx = fixture();
        // Liability 10 × (51 − 1) = 500 each; limit 1000 admits two.
        for _ in 0..2 {
            fx.service
                .place(&request(&fx, Decimal::new(10, 0), Decimal::new(51, 0)))
                .unwrap();
        }
        let err = fx
            .service
            .place(&request(&fx, Decimal::new(10, 0), Decimal::new(51, 0)))
            .unwrap_err();
        assert!(matches!(err, WagerbookError::ExposureLimitExceeded { .. }));
        assert_eq!(fx.exposure.exposure_of(fx.user), Decimal::new(1000, 0));
    }

    #[test]
    fn insufficient_balance_rejected_before_reservation() {
        let fx = fixture();
        let err = fx
            .service
            .place(&request(&fx, Decimal::new(2000, 0), Decimal::new(101, 2)))
            .unwrap_err();
        assert!(matches!(err, WagerbookError::InsufficientBalance { .. }));
        assert_eq!(fx.exposure.exposure_of(fx.user), Decimal::ZERO);
    }

    #[test]
    fn balance_precheck_can_be_disabled() {
        let config = EngineConfig {
            precheck_balance: false,
            ..EngineConfig::default()
        };
        let fx = fixture_with(config);
        // Stake above balance, liability within limit: accepted, balance
        // goes negative (credit-style book).
        let bet = fx
            .service
            .place(&request(&fx, Decimal::new(1500, 0), Decimal::new(101, 2)))
            .unwrap();
        assert_eq!(bet.stake, Decimal::new(1500, 0));
        assert!(fx.ledger.balance_of(fx.user).is_sign_negative());
    }

    #[test]
    fn rejected_placement_leaves_no_trace() {
        let fx = fixture();
        // Liability 10 × 199 = 1990, over the 1000 limit.
        let err = fx
            .service
            .place(&request(&fx, Decimal::new(10, 0), Decimal::new(200, 0)))
            .unwrap_err();
        assert!(matches!(err, WagerbookError::ExposureLimitExceeded { .. }));
        // No reservation, no ledger write, no bet.
        assert_eq!(fx.exposure.exposure_of(fx.user), Decimal::ZERO);
        assert_eq!(fx.ledger.balance_of(fx.user), Decimal::new(1000, 0));
        assert!(fx.book.open_bets_for(fx.market).is_empty());
    }

    #[test]
    fn lay_bet_reserves_stake_as_liability() {
        let fx = fixture();
        let mut req = request(&fx, Decimal::new(100, 0), Decimal::new(50, 1));
        req.side = BetSide::Lay;
        fx.service.place(&req).unwrap();
        assert_eq!(fx.exposure.exposure_of(fx.user), Decimal::new(100, 0));
    }

    #[test]
    fn concurrent_placements_admit_exactly_capacity() {
        let fx = fixture();
        // Liability 250 each; limit 1000 admits exactly 4 of 8 attempts.
        let service = Arc::new(fx.service);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                let req = PlaceBetRequest {
                    user_id: fx.user,
                    market_id: fx.market,
                    selection: "WIN".to_string(),
                    side: BetSide::Back,
                    category: BetCategory::Sports,
                    stake: Decimal::new(10, 0),
                    odds: Decimal::new(26, 0),
                };
                std::thread::spawn(move || service.place(&req).is_ok())
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes, 4);
        assert_eq!(fx.exposure.exposure_of(fx.user), Decimal::new(1000, 0));
        assert_eq!(fx.book.open_bets_for(fx.market).len(), 4);
    }

    #[test]
    fn history_shows_placement_entries() {
        let fx = fixture();
        fx.service
            .place(&request(&fx, Decimal::new(25, 0), Decimal::new(30, 1)))
            .unwrap();
        let history = fx.ledger.history(fx.user, HistoryRange::all());
        assert_eq!(history.len(), 2); // deposit + stake debit
        assert_eq!(history[1].category, LedgerCategory::BetPlaced);
    }
}
