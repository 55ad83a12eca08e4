//! Bet types for the Wagerbook ledger core.
//!
//! A bet commits its stake at placement time and carries the exposure
//! reservation that backs it. Status transitions are one-way: PLACED is the
//! only live state, and the three terminal states never re-transition.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BetCategory, BetId, MarketId, ReservationId, UserId, money::round_money};

/// The outcome a bet is placed on, matched verbatim against the market's
/// winning selection at settlement (e.g. "HOME", "DRAW", "OVER_2_5").
pub type Selection = String;

/// Which side of the price the bettor takes. Controls the liability
/// formula, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetSide {
    /// Betting *for* the selection: liability is `stake × (odds − 1)`.
    Back,
    /// Betting *against* the selection: liability is the stake itself.
    Lay,
}

impl std::fmt::Display for BetSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Back => write!(f, "BACK"),
            Self::Lay => write!(f, "LAY"),
        }
    }
}

/// Lifecycle status of a bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetStatus {
    Placed,
    SettledWon,
    SettledLost,
    Voided,
}

impl BetStatus {
    /// Terminal states never re-transition.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Placed)
    }

    /// Whether a transition to `next` is legal. The only legal moves are
    /// PLACED → one of the three terminal states.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(self, Self::Placed) && next.is_terminal()
    }
}

impl std::fmt::Display for BetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Placed => write!(f, "PLACED"),
            Self::SettledWon => write!(f, "SETTLED_WON"),
            Self::SettledLost => write!(f, "SETTLED_LOST"),
            Self::Voided => write!(f, "VOIDED"),
        }
    }
}

/// Core bet struct. References the [`ReservationId`] backing its exposure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bet {
    pub id: BetId,
    pub user_id: UserId,
    pub market_id: MarketId,
    pub selection: Selection,
    pub side: BetSide,
    pub category: BetCategory,
    pub stake: Decimal,
    /// Decimal odds (e.g. 2.50).
    pub odds: Decimal,
    pub status: BetStatus,
    /// The exposure reservation made at placement, released at resolution.
    pub reservation_id: ReservationId,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl Bet {
    /// Worst-case open liability this bet puts on the bettor's credit
    /// limit, per side semantics.
    #[must_use]
    pub fn potential_liability(&self) -> Decimal {
        match self.side {
            BetSide::Back => round_money(self.stake * (self.odds - Decimal::ONE)),
            BetSide::Lay => self.stake,
        }
    }

    /// Net winnings if this bet wins: `stake × odds − stake`. The stake
    /// itself was already debited at placement and is returned separately
    /// in the settlement cascade.
    #[must_use]
    pub fn net_winnings(&self) -> Decimal {
        round_money(self.stake * self.odds - self.stake)
    }

    /// Whether this bet wins against the market's winning selection.
    #[must_use]
    pub fn is_winner(&self, winning_selection: &str) -> bool {
        match self.side {
            BetSide::Back => self.selection == winning_selection,
            BetSide::Lay => self.selection != winning_selection,
        }
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Bet {
    pub fn dummy_back(stake: Decimal, odds: Decimal) -> Self {
        Self::dummy_for_user(UserId::new(), MarketId::new(), stake, odds)
    }

    pub fn dummy_for_user(
        user_id: UserId,
        market_id: MarketId,
        stake: Decimal,
        odds: Decimal,
    ) -> Self {
        Self {
            id: BetId::new(),
            user_id,
            market_id,
            selection: "WIN".to_string(),
            side: BetSide::Back,
            category: BetCategory::Sports,
            stake,
            odds,
            status: BetStatus::Placed,
            reservation_id: ReservationId::new(),
            created_at: Utc::now(),
            settled_at: None,
        }
    }
}
