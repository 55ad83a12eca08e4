//! System-wide constants for the Wagerbook ledger core.

/// Decimal places of the smallest currency unit. All ledger amounts are
/// rounded to this precision before being written.
pub const CURRENCY_DP: u32 = 2;

/// Maximum ancestor-chain length a hierarchy traversal will walk before
/// declaring the hierarchy broken. Any parent chain longer than this is
/// treated as a cycle.
pub const MAX_CHAIN_DEPTH: usize = 32;

/// Settlement idempotency cache size (number of settlement keys to remember).
pub const SETTLEMENT_IDEMPOTENCY_CACHE_SIZE: usize = 100_000;

/// Minimum decimal odds a bet may carry. At exactly 1.0 a back bet has zero
/// liability and zero payout; anything below is malformed input.
pub const MIN_ODDS_NUMERATOR: i64 = 101;

/// Scale for [`MIN_ODDS_NUMERATOR`] (101 / 10^2 = 1.01).
pub const MIN_ODDS_SCALE: u32 = 2;

/// Maximum length of a ledger entry remark before truncation.
pub const MAX_REMARK_LEN: usize = 256;
