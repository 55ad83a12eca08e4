//! # wagerbook-ledger
//!
//! **Ledger Plane**: the append-only, per-user financial log that every
//! balance in the system is derived from.
//!
//! ## Guarantees
//!
//! 1. Entries are immutable once written; corrections are new offsetting
//!    entries.
//! 2. Appends for one user are linearizable — each entry's balance
//!    snapshot extends the previous one, never a stale read.
//! 3. `balance_of(user) == Σ credit − Σ debit` over that user's entries,
//!    in creation order, at every observable instant.
//!
//! Writers are the placement and settlement planes only; everything else
//! (reporting, audit) reads.

pub mod store;

pub use store::{HistoryRange, LedgerStore};
