//! # wagerbook-settlement
//!
//! **Finality Plane**: idempotent market resolution, commission cascade
//! execution, and the zero-sum conservation audit.
//!
//! ## Architecture
//!
//! The finality plane receives market resolution events and:
//! 1. Validates idempotency (no double-settlement per (market, generation))
//! 2. Resolves each open bet's outcome and ancestor chain
//! 3. Writes the commission cascade to the ledger, all-or-nothing per bet
//! 4. Moves bets to terminal states and releases exposure reservations
//! 5. Verifies the cascade conservation invariant per settled bet
//!
//! ## Delivery Model
//!
//! Resolution events arrive at-least-once. Redelivered settle/void calls
//! return an `AlreadyApplied` report with zero writes; duplicate exposure
//! releases are no-ops. That pairing is what makes at-least-once safe.

pub mod applied;
pub mod conservation;
pub mod engine;

pub use applied::AppliedSettlements;
pub use conservation::{cascade_digest, verify_cascade};
pub use engine::{SettlementEngine, SettlementOutcome, SettlementReport};
