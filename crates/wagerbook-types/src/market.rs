//! Market lifecycle types.
//!
//! Each market moves through a small one-way state machine:
//! **OPEN ⇄ SUSPENDED → SETTLED | VOIDED**
//!
//! Suspension is reversible (markets routinely suspend around score events
//! and reopen); SETTLED and VOIDED are terminal. The winning selection is
//! recorded only at SETTLED.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{MarketId, Selection};

/// The lifecycle state of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketState {
    /// Accepting new bets.
    Open,
    /// Temporarily closed to new bets; open bets remain live.
    Suspended,
    /// Resolved with a winning selection. Terminal.
    Settled,
    /// Cancelled upstream; stakes refunded. Terminal.
    Voided,
}

impl MarketState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Settled | Self::Voided)
    }

    /// Whether a transition to `next` is legal.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        match self {
            Self::Open => matches!(next, Self::Suspended | Self::Settled | Self::Voided),
            Self::Suspended => matches!(next, Self::Open | Self::Settled | Self::Voided),
            Self::Settled | Self::Voided => false,
        }
    }
}

impl std::fmt::Display for MarketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Suspended => write!(f, "SUSPENDED"),
            Self::Settled => write!(f, "SETTLED"),
            Self::Voided => write!(f, "VOIDED"),
        }
    }
}

/// One settleable market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub id: MarketId,
    /// Human-readable label (e.g. "Match Odds").
    pub name: String,
    pub state: MarketState,
    /// Set exactly once, at the SETTLED transition.
    pub winning_selection: Option<Selection>,
    /// Settlement generation, part of the idempotency key. Bumped if an
    /// operator ever rolls a settlement back out-of-band, so a later
    /// re-settlement cannot collide with the stale applied-marker.
    pub settlement_generation: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Market {
    /// A fresh OPEN market.
    #[must_use]
    pub fn open(id: MarketId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            state: MarketState::Open,
            winning_selection: None,
            settlement_generation: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether new bets may be placed right now.
    #[must_use]
    pub fn accepts_bets(&self) -> bool {
        self.state == MarketState::Open
    }
}
