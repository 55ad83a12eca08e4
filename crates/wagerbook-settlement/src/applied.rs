//! Settlement idempotency guard — prevents double-settlement.
//!
//! Resolution events arrive at-least-once, so each (market, generation)
//! pair may be delivered any number of times. The first application is
//! recorded here; every later attempt short-circuits before a single
//! ledger write happens.
//!
//! The guard maintains an LRU-style bounded cache so memory usage stays
//! predictable in long-running processes.

use std::collections::{HashSet, VecDeque};

use wagerbook_types::{Result, SettlementKey, WagerbookError};

/// Prevents double-application of a settlement pass.
///
/// Internally stores a bounded set of applied [`SettlementKey`]s with LRU
/// eviction. When the set reaches `max_size`, the oldest entry is evicted
/// to make room.
pub struct AppliedSettlements {
    /// Keys that have already been applied.
    applied: HashSet<SettlementKey>,
    /// Insertion order for LRU eviction (front = oldest).
    order: VecDeque<SettlementKey>,
    /// Maximum number of entries before eviction kicks in.
    max_size: usize,
}

impl AppliedSettlements {
    /// Create a new guard with the given maximum cache size.
    ///
    /// # Panics
    /// Panics if `max_size` is zero.
    pub fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "AppliedSettlements max_size must be > 0");
        Self {
            applied: HashSet::with_capacity(max_size),
            order: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Mark a settlement pass as applied.
    ///
    /// # Errors
    /// Returns [`WagerbookError::DuplicateSettlement`] if `key` has
    /// already been marked — callers treat that as a success no-op.
    pub fn mark_applied(&mut self, key: SettlementKey) -> Result<()> {
        if self.applied.contains(&key) {
            return Err(WagerbookError::DuplicateSettlement(key));
        }

        // Evict oldest if at capacity.
        if self.applied.len() >= self.max_size {
            if let Some(oldest) = self.order.pop_front() {
                self.applied.remove(&oldest);
            }
        }

        self.applied.insert(key);
        self.order.push_back(key);
        Ok(())
    }

    /// Check whether a settlement pass has already been applied.
    pub fn is_applied(&self, key: &SettlementKey) -> bool {
        self.applied.contains(key)
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.applied.len()
    }

    /// Whether the guard is empty (no passes tracked).
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use wagerbook_types::MarketId;

    use super::*;

    #[test]
    fn first_application_ok() {
        let mut guard = AppliedSettlements::new(100);
        let key = SettlementKey::deterministic(MarketId::new(), 0);
        assert!(guard.mark_applied(key).is_ok());
        assert!(guard.is_applied(&key));
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn double_application_blocked() {
        let mut guard = AppliedSettlements::new(100);
        let key = SettlementKey::deterministic(MarketId::new(), 0);
        guard.mark_applied(key).unwrap();

        let err = guard.mark_applied(key).unwrap_err();
        assert!(
            matches!(err, WagerbookError::DuplicateSettlement(k) if k == key),
            "Expected DuplicateSettlement, got: {err:?}"
        );
    }

    #[test]
    fn generations_are_distinct_keys() {
        let mut guard = AppliedSettlements::new(100);
        let market = MarketId::new();
        guard
            .mark_applied(SettlementKey::deterministic(market, 0))
            .unwrap();
        // A bumped generation is a fresh pass, not a duplicate.
        guard
            .mark_applied(SettlementKey::deterministic(market, 1))
            .unwrap();
        assert_eq!(guard.len(), 2);
    }

    #[test]
    fn evicts_oldest() {
        let mut guard = AppliedSettlements::new(3);
        let market = MarketId::new();
        let k1 = SettlementKey::deterministic(market, 1);
        let k2 = SettlementKey::deterministic(market, 2);
        let k3 = SettlementKey::deterministic(market, 3);
        let k4 = SettlementKey::deterministic(market, 4);

        guard.mark_applied(k1).unwrap();
        guard.mark_applied(k2).unwrap();
        guard.mark_applied(k3).unwrap();
        assert_eq!(guard.len(), 3);

        // Adding k4 should evict k1 (the oldest).
        guard.mark_applied(k4).unwrap();
        assert_eq!(guard.len(), 3);
        assert!(!guard.is_applied(&k1), "k1 should have been evicted");
        assert!(guard.is_applied(&k2));
        assert!(guard.is_applied(&k3));
        assert!(guard.is_applied(&k4));
    }

    #[test]
    fn empty_guard() {
        let guard = AppliedSettlements::new(10);
        assert!(guard.is_empty());
        assert_eq!(guard.len(), 0);
        assert!(!guard.is_applied(&SettlementKey::deterministic(MarketId::new(), 0)));
    }

    #[test]
    #[should_panic(expected = "max_size must be > 0")]
    fn zero_max_size_panics() {
        let _ = AppliedSettlements::new(0);
    }
}
