//! Settlement engine — idempotent market resolution.
//!
//! For one resolved market the engine walks every bet still in PLACED
//! state and, per bet: determines the outcome, resolves the owner's
//! ancestor chain, computes the commission cascade, writes it to the
//! ledger, moves the bet to its terminal state, and releases the exposure
//! reservation.
//!
//! Settlement of a given market is serialized by a per-market lock, and
//! each (market, generation) pass is applied at most once: redelivered
//! resolution events short-circuit with zero writes.
//!
//! A fault inside one bet's cascade (broken hierarchy, imbalance) aborts
//! the pass before that bet writes anything and leaves the market
//! unresolved; bets settled earlier in the pass are terminal and are not
//! revisited when the pass is retried after the fault is fixed.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use wagerbook_commission::{HierarchyDirectory, distribute};
use wagerbook_ingress::{BetBook, ExposureTracker, MarketDirectory};
use wagerbook_ledger::LedgerStore;
use wagerbook_types::{
    Bet, BetStatus, EngineConfig, LedgerCategory, LedgerEntry, MarketId, MarketState, Result,
    SettlementKey, WagerbookError,
};

use crate::applied::AppliedSettlements;
use crate::conservation::{cascade_digest, verify_cascade};

/// How a settlement call concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// This call performed the pass and wrote the cascades.
    Applied,
    /// The pass had already been applied; nothing was written.
    AlreadyApplied,
}

/// Summary of one settlement or void pass.
#[derive(Debug, Clone)]
pub struct SettlementReport {
    pub market_id: MarketId,
    pub key: SettlementKey,
    pub outcome: SettlementOutcome,
    pub bets_won: usize,
    pub bets_lost: usize,
    pub bets_voided: usize,
    pub entries_written: usize,
    /// Deterministic digest over the movements written by this pass.
    pub cascade_digest: [u8; 32],
}

impl SettlementReport {
    fn already_applied(market_id: MarketId, key: SettlementKey) -> Self {
        Self {
            market_id,
            key,
            outcome: SettlementOutcome::AlreadyApplied,
            bets_won: 0,
            bets_lost: 0,
            bets_voided: 0,
            entries_written: 0,
            cascade_digest: cascade_digest(&[]),
        }
    }
}

/// Orchestrates settlement and void passes over resolved markets.
pub struct SettlementEngine {
    ledger: Arc<LedgerStore>,
    exposure: Arc<ExposureTracker>,
    markets: Arc<MarketDirectory>,
    book: Arc<BetBook>,
    hierarchy: Arc<HierarchyDirectory>,
    applied: Mutex<AppliedSettlements>,
    /// One lock per market: at most one pass in flight per market id.
    market_locks: RwLock<HashMap<MarketId, Arc<Mutex<()>>>>,
}

impl SettlementEngine {
    #[must_use]
    pub fn new(
        ledger: Arc<LedgerStore>,
        exposure: Arc<ExposureTracker>,
        markets: Arc<MarketDirectory>,
        book: Arc<BetBook>,
        hierarchy: Arc<HierarchyDirectory>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            ledger,
            exposure,
            markets,
            book,
            hierarchy,
            applied: Mutex::new(AppliedSettlements::new(config.applied_cache_size)),
            market_locks: RwLock::new(HashMap::new()),
        }
    }

    /// Settle a market: pay every open bet out against `winning_selection`.
    ///
    /// Idempotent under at-least-once delivery — a redelivered event
    /// returns an `AlreadyApplied` report with zero writes.
    ///
    /// # Errors
    /// - `MarketNotFound` if the id does not resolve.
    /// - `InvalidTransition` if the market was voided.
    /// - `BrokenHierarchy` / `CascadeImbalance` / `CommissionOverflow` on
    ///   a per-bet fault; the pass aborts and the market stays unresolved
    ///   until the fault is fixed and the event is redelivered.
    pub fn settle(&self, market_id: MarketId, winning_selection: &str) -> Result<SettlementReport> {
        let market_lock = self.market_lock(market_id);
        let _guard = market_lock.lock();

        let market = self.markets.get(market_id)?;
        let key = SettlementKey::deterministic(market_id, market.settlement_generation);
        // A voided market is a conflicting event, not a redelivery.
        if market.state == MarketState::Voided {
            return Err(WagerbookError::InvalidTransition {
                from: market.state,
                to: MarketState::Settled,
            });
        }
        if market.state == MarketState::Settled || self.applied.lock().is_applied(&key) {
            tracing::warn!(market = %market_id, %key, "Duplicate settlement ignored");
            return Ok(SettlementReport::already_applied(market_id, key));
        }

        let bets = self.book.open_bets_for(market_id);
        let mut bets_won = 0;
        let mut bets_lost = 0;
        let mut written = Vec::new();

        for bet in &bets {
            let won = self.settle_bet(bet, winning_selection, &mut written)?;
            if won {
                bets_won += 1;
            } else {
                bets_lost += 1;
            }
        }

        self.markets.mark_settled(market_id, winning_selection)?;
        self.applied.lock().mark_applied(key)?;

        let digest = cascade_digest(&written);
        tracing::info!(
            market = %market_id,
            %key,
            winning_selection,
            bets_won,
            bets_lost,
            entries = written.len(),
            digest = hex::encode(digest),
            "Settlement pass complete"
        );
        Ok(SettlementReport {
            market_id,
            key,
            outcome: SettlementOutcome::Applied,
            bets_won,
            bets_lost,
            bets_voided: 0,
            entries_written: written.len(),
            cascade_digest: digest,
        })
    }

    /// Void a market: refund every open bet's stake, no commission.
    ///
    /// Idempotent under at-least-once delivery, same as [`Self::settle`].
    ///
    /// # Errors
    /// - `MarketNotFound` if the id does not resolve.
    /// - `InvalidTransition` if the market was already settled.
    pub fn void(&self, market_id: MarketId) -> Result<SettlementReport> {
        let market_lock = self.market_lock(market_id);
        let _guard = market_lock.lock();

        let market = self.markets.get(market_id)?;
        let key = SettlementKey::deterministic(market_id, market.settlement_generation);
        // A settled market is a conflicting event, not a redelivery.
        if market.state == MarketState::Settled {
            return Err(WagerbookError::InvalidTransition {
                from: market.state,
                to: MarketState::Voided,
            });
        }
        if market.state == MarketState::Voided || self.applied.lock().is_applied(&key) {
            tracing::warn!(market = %market_id, %key, "Duplicate void ignored");
            return Ok(SettlementReport::already_applied(market_id, key));
        }

        let bets = self.book.open_bets_for(market_id);
        let mut written = Vec::new();
        for bet in &bets {
            let entry = self.ledger.append(
                bet.user_id,
                LedgerCategory::VoidRefund,
                bet.stake,
                Decimal::ZERO,
                Some(bet.id),
                "market voided, stake refunded",
            )?;
            written.push(entry);
            self.book.mark_resolved(bet.id, BetStatus::Voided, Utc::now())?;
            self.exposure.release(bet.reservation_id)?;
            verify_cascade(bet.id, &self.ledger.entries_for_bet(bet.id))?;
        }

        self.markets.mark_voided(market_id)?;
        self.applied.lock().mark_applied(key)?;

        let digest = cascade_digest(&written);
        tracing::info!(
            market = %market_id,
            %key,
            bets_voided = bets.len(),
            entries = written.len(),
            "Void pass complete"
        );
        Ok(SettlementReport {
            market_id,
            key,
            outcome: SettlementOutcome::Applied,
            bets_won: 0,
            bets_lost: 0,
            bets_voided: bets.len(),
            entries_written: written.len(),
            cascade_digest: digest,
        })
    }

    /// Settle one bet: cascade computation, ledger writes, terminal
    /// status, exposure release, conservation audit. Returns whether the
    /// bet won.
    fn settle_bet(
        &self,
        bet: &Bet,
        winning_selection: &str,
        written: &mut Vec<LedgerEntry>,
    ) -> Result<bool> {
        let won = bet.is_winner(winning_selection);
        let outcome_amount = if won { bet.net_winnings() } else { Decimal::ZERO };

        let chain = self.hierarchy.chain_of(bet.user_id).inspect_err(|err| {
            // Data-integrity fault: loud, never silently skipped.
            tracing::error!(
                bet = %bet.id,
                user = %bet.user_id,
                %err,
                "Hierarchy resolution failed; settlement halted for operator review"
            );
        })?;

        let lines = distribute(bet, outcome_amount, &chain)?;
        for line in &lines {
            let entry = self.ledger.append(
                line.user_id,
                line.category,
                line.credit,
                line.debit,
                Some(bet.id),
                &line.remark,
            )?;
            tracing::debug!(
                bet = %bet.id,
                user = %line.user_id,
                category = %line.category,
                credit = %line.credit,
                debit = %line.debit,
                "Cascade line written"
            );
            written.push(entry);
        }

        let status = if won {
            BetStatus::SettledWon
        } else {
            BetStatus::SettledLost
        };
        self.book.mark_resolved(bet.id, status, Utc::now())?;
        self.exposure.release(bet.reservation_id)?;

        // Zero-sum audit over the full tagged cascade, placement included.
        verify_cascade(bet.id, &self.ledger.entries_for_bet(bet.id))?;
        Ok(won)
    }

    fn market_lock(&self, market_id: MarketId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.market_locks.read().get(&market_id) {
            return Arc::clone(lock);
        }
        let mut locks = self.market_locks.write();
        Arc::clone(locks.entry(market_id).or_default())
    }
}
