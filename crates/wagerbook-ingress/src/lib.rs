//! # wagerbook-ingress
//!
//! **Placement Plane**: bet ingress, exposure reservation, market state
//! gating, and bet persistence.
//!
//! ## Architecture
//!
//! The placement plane sits between the API layer and settlement:
//! 1. **MarketDirectory**: live market registry — placement reads state
//!    through the same lock suspensions write through
//! 2. **ExposureTracker**: per-user serialized reserve/release against
//!    credit limits
//! 3. **BetBook**: bets indexed by id and market; settlement drains the
//!    open view
//! 4. **BetPlacementService**: orchestrates the placement flow and the
//!    compensating release on failure
//!
//! ## Placement Flow
//!
//! ```text
//! API → MarketDirectory.state_of() → ExposureTracker.reserve()
//!     → LedgerStore.append(BET_PLACED) → BetBook.insert()
//! ```
//!
//! Every open bet holds a reservation; settlement releases it.

pub mod bet_book;
pub mod exposure;
pub mod market_directory;
pub mod placement;

pub use bet_book::BetBook;
pub use exposure::ExposureTracker;
pub use market_directory::MarketDirectory;
pub use placement::{BetPlacementService, PlaceBetRequest};
