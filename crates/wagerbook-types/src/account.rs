//! Account hierarchy and commission configuration types.
//!
//! Accounts form a reseller tree: players hang off agents, agents off
//! super-agents, and so on up to the platform root. Ownership is a parent
//! *reference* resolved by id lookup — never a materialized object graph.
//! Each level carries a [`CommissionProfile`] describing how much of the
//! platform share it owns and how it earns commission on settled bets.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Which commission pool a bet draws from. Sports and casino pools are
/// configured independently; a bet consults exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetCategory {
    Sports,
    Casino,
}

impl std::fmt::Display for BetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sports => write!(f, "SPORTS"),
            Self::Casino => write!(f, "CASINO"),
        }
    }
}

/// How one hierarchy level earns commission on a settled bet.
///
/// A closed variant — the commission engine matches exhaustively, so a new
/// commission scheme is a compile error at every call site until handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommissionPlan {
    /// This level takes nothing.
    NoCommission,
    /// `stake × rate / 100`, regardless of outcome.
    PercentageOfStake { rate: Decimal },
    /// `max(winnings, 0) × rate / 100` — pays only on winning bets.
    PercentageOfWinnings { rate: Decimal },
}

impl CommissionPlan {
    /// Whether this plan can ever produce a non-zero commission.
    #[must_use]
    pub fn is_active(&self) -> bool {
        match self {
            Self::NoCommission => false,
            Self::PercentageOfStake { rate } | Self::PercentageOfWinnings { rate } => {
                !rate.is_zero()
            }
        }
    }

    /// The configured rate, if any.
    #[must_use]
    pub fn rate(&self) -> Option<Decimal> {
        match self {
            Self::NoCommission => None,
            Self::PercentageOfStake { rate } | Self::PercentageOfWinnings { rate } => Some(*rate),
        }
    }
}

/// Commission configuration for one hierarchy level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionProfile {
    /// Platform share percentage owned at this level.
    pub share_percent: Decimal,
    /// Share percentage still available to delegate to levels below.
    /// Must never exceed `share_percent`.
    pub available_share_percent: Decimal,
    /// Commission plan applied to sports bets.
    pub sports: CommissionPlan,
    /// Commission plan applied to casino bets.
    pub casino: CommissionPlan,
}

impl CommissionProfile {
    /// A profile that owns everything and takes no commission. The usual
    /// starting point for the platform root.
    #[must_use]
    pub fn root() -> Self {
        Self {
            share_percent: Decimal::new(100, 0),
            available_share_percent: Decimal::new(100, 0),
            sports: CommissionPlan::NoCommission,
            casino: CommissionPlan::NoCommission,
        }
    }

    /// The plan governing a bet of the given category.
    #[must_use]
    pub fn plan_for(&self, category: BetCategory) -> &CommissionPlan {
        match category {
            BetCategory::Sports => &self.sports,
            BetCategory::Casino => &self.casino,
        }
    }

    /// Whether the profile is internally consistent: shares within
    /// 0..=100 and delegation not exceeding ownership.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let hundred = Decimal::new(100, 0);
        !self.share_percent.is_sign_negative()
            && !self.available_share_percent.is_sign_negative()
            && self.share_percent <= hundred
            && self.available_share_percent <= self.share_percent
    }
}

/// One node of the reseller hierarchy.
///
/// Balance and exposure are deliberately absent: balance is derived from
/// the ledger and exposure from the tracker. This struct is the read-only
/// configuration snapshot delivered by the administration collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountNode {
    pub user_id: UserId,
    /// Human short code (e.g. "SA-104", "AG-2210").
    pub code: String,
    /// Ownership edge. `None` marks the platform root.
    pub parent: Option<UserId>,
    /// Hard cap on this account's aggregate open liability.
    pub credit_limit: Decimal,
    pub profile: CommissionProfile,
}

impl AccountNode {
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
