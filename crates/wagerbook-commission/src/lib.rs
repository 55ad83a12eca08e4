//! # wagerbook-commission
//!
//! **Computation Plane**: hierarchy resolution and pure commission
//! cascade computation.
//!
//! ## Architecture
//!
//! Two pieces, both side-effect free with respect to the ledger:
//!
//! 1. [`HierarchyDirectory`]: the reseller tree as adjacency-by-id.
//!    Snapshots from the administration collaborator are validated
//!    fail-closed at load time (share over-delegation, dangling parents,
//!    cycles). `chain_of` resolves a bettor's ancestor chain.
//! 2. [`distribute`]: given a resolved bet, its outcome amount, and its
//!    ancestor chain, computes the exact ledger movements that settle it
//!    — owner principal, per-level commissions, and the root balancing
//!    line that keeps every cascade zero-sum.
//!
//! The settlement plane owns the writes; this crate only decides amounts.

pub mod distribute;
pub mod hierarchy;

pub use distribute::{CascadeLine, distribute};
pub use hierarchy::HierarchyDirectory;
