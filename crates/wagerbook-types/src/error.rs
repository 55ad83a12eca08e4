//! Error types for the Wagerbook ledger core.
//!
//! All errors use the `WB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Placement errors
//! - 2xx: Ledger / balance errors
//! - 3xx: Exposure / reservation errors
//! - 4xx: Market state errors
//! - 5xx: Hierarchy / commission errors
//! - 6xx: Settlement errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{BetId, BetStatus, MarketId, MarketState, ReservationId, SettlementKey, UserId};

/// Central error enum for all Wagerbook operations.
#[derive(Debug, Error)]
pub enum WagerbookError {
    // =================================================================
    // Placement Errors (1xx)
    // =================================================================
    /// The stake is zero, negative, or otherwise unusable.
    #[error("WB_ERR_100: Invalid stake: {stake}")]
    InvalidStake { stake: Decimal },

    /// The odds are below the minimum acceptable price.
    #[error("WB_ERR_101: Invalid odds: {odds} (minimum {minimum})")]
    InvalidOdds { odds: Decimal, minimum: Decimal },

    /// The market is not open for new bets.
    #[error("WB_ERR_102: Market {market_id} is {state}, not OPEN")]
    MarketClosed {
        market_id: MarketId,
        state: MarketState,
    },

    /// The market is temporarily suspended; placement is rejected, not queued.
    #[error("WB_ERR_103: Market {0} is suspended")]
    MarketSuspended(MarketId),

    // =================================================================
    // Ledger / Balance Errors (2xx)
    // =================================================================
    /// Not enough balance to commit the stake.
    #[error("WB_ERR_200: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    /// A ledger entry must carry exactly one non-zero side.
    #[error("WB_ERR_201: Malformed ledger entry: {reason}")]
    MalformedEntry { reason: String },

    // =================================================================
    // Exposure / Reservation Errors (3xx)
    // =================================================================
    /// The reservation would push exposure past the credit limit.
    #[error(
        "WB_ERR_300: Exposure limit exceeded: current {current} + requested {requested} > limit {limit}"
    )]
    ExposureLimitExceeded {
        current: Decimal,
        requested: Decimal,
        limit: Decimal,
    },

    /// The reservation id does not resolve to any tracked reservation.
    #[error("WB_ERR_301: Unknown reservation: {0}")]
    UnknownReservation(ReservationId),

    // =================================================================
    // Market State Errors (4xx)
    // =================================================================
    /// The market id does not resolve.
    #[error("WB_ERR_400: Market not found: {0}")]
    MarketNotFound(MarketId),

    /// The requested state transition is not allowed by the market lifecycle.
    #[error("WB_ERR_401: Invalid market transition: {from} -> {to}")]
    InvalidTransition {
        from: MarketState,
        to: MarketState,
    },

    /// A market with this id already exists.
    #[error("WB_ERR_402: Market already exists: {0}")]
    MarketAlreadyExists(MarketId),

    // =================================================================
    // Hierarchy / Commission Errors (5xx)
    // =================================================================
    /// The ownership chain cannot be resolved — dangling parent reference,
    /// unknown account, or a cycle. Data-integrity fault: fatal, not retried.
    #[error("WB_ERR_500: Broken hierarchy at {user_id}: {reason}")]
    BrokenHierarchy { user_id: UserId, reason: String },

    /// Commission configuration delegates more share than a parent owns,
    /// or configured rates would extract more than the money in play.
    /// Configuration fault: rejected before it can reach settlement.
    #[error("WB_ERR_501: Commission overflow at {user_id}: {reason}")]
    CommissionOverflow { user_id: UserId, reason: String },

    // =================================================================
    // Settlement Errors (6xx)
    // =================================================================
    /// This settlement pass has already been applied (idempotency guard).
    /// Callers treat this as a success no-op, never as a failure.
    #[error("WB_ERR_600: Settlement already applied: {0}")]
    DuplicateSettlement(SettlementKey),

    /// A settlement cascade failed the zero-sum check. The cascade is
    /// aborted before any ledger write.
    #[error(
        "WB_ERR_601: Cascade imbalance for bet {bet_id}: credits {credits} vs debits {debits}"
    )]
    CascadeImbalance {
        bet_id: BetId,
        credits: Decimal,
        debits: Decimal,
    },

    /// The bet is not in PLACED state and cannot be settled or voided again.
    #[error("WB_ERR_602: Bet {bet_id} is {status}, not PLACED")]
    BetNotOpen { bet_id: BetId, status: BetStatus },

    /// The bet id does not resolve.
    #[error("WB_ERR_603: Bet not found: {0}")]
    BetNotFound(BetId),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("WB_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Configuration error (invalid snapshot, missing fields, etc.).
    #[error("WB_ERR_901: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, WagerbookError>;
