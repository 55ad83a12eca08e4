//! Market directory — the live market registry and its state machine.
//!
//! All state reads go through the same `RwLock` the writes go through, so
//! a placement check always observes the most recent suspension: there is
//! no cached state to read stale.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use wagerbook_types::{Market, MarketId, MarketState, Result, WagerbookError};

/// Registry of markets keyed by id.
pub struct MarketDirectory {
    markets: RwLock<HashMap<MarketId, Market>>,
}

impl MarketDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            markets: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new OPEN market.
    ///
    /// # Errors
    /// Returns `MarketAlreadyExists` if the id is taken.
    pub fn create(&self, market_id: MarketId, name: &str) -> Result<Market> {
        let mut markets = self.markets.write();
        if markets.contains_key(&market_id) {
            return Err(WagerbookError::MarketAlreadyExists(market_id));
        }
        let market = Market::open(market_id, name);
        markets.insert(market_id, market.clone());
        tracing::debug!(market = %market_id, name, "Market created");
        Ok(market)
    }

    /// Fetch a market snapshot.
    ///
    /// # Errors
    /// Returns `MarketNotFound` if the id does not resolve.
    pub fn get(&self, market_id: MarketId) -> Result<Market> {
        self.markets
            .read()
            .get(&market_id)
            .cloned()
            .ok_or(WagerbookError::MarketNotFound(market_id))
    }

    /// Current state, read under the same lock every transition writes
    /// through — at least as fresh as the latest suspension.
    ///
    /// # Errors
    /// Returns `MarketNotFound` if the id does not resolve.
    pub fn state_of(&self, market_id: MarketId) -> Result<MarketState> {
        self.markets
            .read()
            .get(&market_id)
            .map(|m| m.state)
            .ok_or(WagerbookError::MarketNotFound(market_id))
    }

    /// Suspend an OPEN market.
    pub fn suspend(&self, market_id: MarketId) -> Result<Market> {
        self.transition(market_id, MarketState::Suspended)
    }

    /// Reopen a SUSPENDED market.
    pub fn reopen(&self, market_id: MarketId) -> Result<Market> {
        self.transition(market_id, MarketState::Open)
    }

    /// Move a live market to SETTLED and record the winning selection.
    ///
    /// # Errors
    /// Returns `MarketNotFound` / `InvalidTransition` as applicable.
    pub fn mark_settled(&self, market_id: MarketId, winning_selection: &str) -> Result<Market> {
        let mut markets = self.markets.write();
        let market = markets
            .get_mut(&market_id)
            .ok_or(WagerbookError::MarketNotFound(market_id))?;
        if !market.state.can_transition_to(MarketState::Settled) {
            return Err(WagerbookError::InvalidTransition {
                from: market.state,
                to: MarketState::Settled,
            });
        }
        market.state = MarketState::Settled;
        market.winning_selection = Some(winning_selection.to_string());
        market.updated_at = Utc::now();
        tracing::info!(market = %market_id, winning_selection, "Market settled");
        Ok(market.clone())
    }

    /// Move a live market to VOIDED.
    pub fn mark_voided(&self, market_id: MarketId) -> Result<Market> {
        self.transition(market_id, MarketState::Voided)
    }

    fn transition(&self, market_id: MarketId, to: MarketState) -> Result<Market> {
        let mut markets = self.markets.write();
        let market = markets
            .get_mut(&market_id)
            .ok_or(WagerbookError::MarketNotFound(market_id))?;
        if !market.state.can_transition_to(to) {
            return Err(WagerbookError::InvalidTransition {
                from: market.state,
                to,
            });
        }
        let from = market.state;
        market.state = to;
        market.updated_at = Utc::now();
        tracing::debug!(market = %market_id, %from, %to, "Market transition");
        Ok(market.clone())
    }
}

impl Default for MarketDirectory {
    fn default() -> Self {
        Self::new()
    }
}
