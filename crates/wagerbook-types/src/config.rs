//! Configuration for the Wagerbook ledger core.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Tunable knobs for the placement and settlement engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum ancestor-chain depth before a traversal is treated as a
    /// cycle and fails with `BrokenHierarchy`.
    pub max_chain_depth: usize,
    /// Number of applied settlement keys the idempotency guard remembers.
    pub applied_cache_size: usize,
    /// Whether placement checks `balance ≥ stake` before debiting.
    /// Credit-only books run with this off.
    pub precheck_balance: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_chain_depth: constants::MAX_CHAIN_DEPTH,
            applied_cache_size: constants::SETTLEMENT_IDEMPOTENCY_CACHE_SIZE,
            precheck_balance: true,
        }
    }
}
