//! # wagerbook-types
//!
//! Shared types, errors, and configuration for the **Wagerbook**
//! hierarchical betting ledger.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`UserId`], [`BetId`], [`MarketId`], [`EntryId`], [`ReservationId`], [`SettlementKey`]
//! - **Account model**: [`AccountNode`], [`CommissionProfile`], [`CommissionPlan`], [`BetCategory`]
//! - **Bet model**: [`Bet`], [`BetStatus`], [`BetSide`], [`Selection`]
//! - **Market model**: [`Market`], [`MarketState`]
//! - **Ledger model**: [`LedgerEntry`], [`LedgerCategory`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`WagerbookError`] with `WB_ERR_` prefix codes
//! - **Constants**: currency precision and system-wide limits

pub mod account;
pub mod bet;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod ledger;
pub mod market;
pub mod money;

// Re-export all primary types at crate root for ergonomic imports:
//   use wagerbook_types::{Bet, BetStatus, LedgerEntry, ...};

pub use account::*;
pub use bet::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use ledger::*;
pub use market::*;

// Constants are accessed via `wagerbook_types::constants::FOO`, and the
// rounding helper via `wagerbook_types::money::round_money`
// (not re-exported to avoid name collisions).
