//! Ledger entry types — the append-only financial audit trail.
//!
//! Every balance in the system is derivable by summing a user's entries in
//! creation order; the `balance_after` snapshot is a convenience, not a
//! second source of truth. Entries are never mutated or deleted —
//! corrections are new offsetting entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BetId, EntryId, UserId};

/// What kind of money movement an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerCategory {
    /// External funds added through the administration collaborator.
    Deposit,
    /// Stake committed at bet placement (debit, bettor).
    BetPlaced,
    /// Stake returned plus net winnings minus commission (credit, bettor).
    BetWon,
    /// Lost stake collected at the hierarchy root (credit, root).
    BetLost,
    /// Agent commission earned on a settled bet (credit, ancestor).
    Commission,
    /// Net payout funded by the hierarchy root on a winning bet (debit, root).
    SettlementFunding,
    /// Stake refunded for a voided market (credit, bettor).
    VoidRefund,
    /// Credit-limit adjustment settled through the ledger.
    LimitUpdate,
}

impl std::fmt::Display for LedgerCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit => write!(f, "DEPOSIT"),
            Self::BetPlaced => write!(f, "BET_PLACED"),
            Self::BetWon => write!(f, "BET_WON"),
            Self::BetLost => write!(f, "BET_LOST"),
            Self::Commission => write!(f, "COMMISSION"),
            Self::SettlementFunding => write!(f, "SETTLEMENT_FUNDING"),
            Self::VoidRefund => write!(f, "VOID_REFUND"),
            Self::LimitUpdate => write!(f, "LIMIT_UPDATE"),
        }
    }
}

/// One immutable row of a user's financial log.
///
/// Exactly one of `credit` / `debit` is non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub user_id: UserId,
    pub category: LedgerCategory,
    pub credit: Decimal,
    pub debit: Decimal,
    /// Balance snapshot at write time: previous balance + credit − debit.
    pub balance_after: Decimal,
    /// Set on every entry belonging to a bet's cascade, placement included.
    pub bet_id: Option<BetId>,
    pub remark: String,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Signed movement: credit − debit.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.credit - self.debit
    }

    /// Whether exactly one side is non-zero and neither is negative.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let one_sided = !self.credit.is_zero() ^ !self.debit.is_zero();
        one_sided && !self.credit.is_sign_negative() && !self.debit.is_sign_negative()
    }
}
