//! Pure commission cascade computation.
//!
//! [`distribute`] turns one resolved bet plus its ancestor chain into the
//! list of ledger movements that settle it. No side effects: the same
//! inputs always produce the same lines, and nothing is written here.
//!
//! # Accounting Convention
//!
//! A bet's cascade is every ledger entry tagged with the bet's id, the
//! placement debit included. The lines returned here therefore sum to
//! exactly `+stake` (credits minus debits), offsetting the stake debited
//! at placement — money is conserved, only moved between ledger rows:
//!
//! - **Won**: owner is credited `stake + winnings − total commission`;
//!   each ancestor is credited its commission; the root funds the
//!   balancing remainder as a debit.
//! - **Lost**: each ancestor is credited its commission; the root collects
//!   the balancing remainder (`stake − total commission`) as a credit.
//!
//! Commissions are rounded half-up to the smallest currency unit per
//! level; the root's balancing line absorbs any residual so the zero-sum
//! invariant holds exactly, never approximately.

use rust_decimal::Decimal;
use wagerbook_types::{
    AccountNode, Bet, CommissionPlan, LedgerCategory, Result, UserId, WagerbookError,
    money::round_money,
};

/// One row of a settlement cascade, ready to be appended to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeLine {
    pub user_id: UserId,
    pub category: LedgerCategory,
    pub credit: Decimal,
    pub debit: Decimal,
    pub remark: String,
}

impl CascadeLine {
    fn credit(user_id: UserId, category: LedgerCategory, amount: Decimal, remark: &str) -> Self {
        Self {
            user_id,
            category,
            credit: amount,
            debit: Decimal::ZERO,
            remark: remark.to_string(),
        }
    }

    fn debit(user_id: UserId, category: LedgerCategory, amount: Decimal, remark: &str) -> Self {
        Self {
            user_id,
            category,
            credit: Decimal::ZERO,
            debit: amount,
            remark: remark.to_string(),
        }
    }
}

/// Compute the settlement cascade for one resolved bet.
///
/// `outcome_amount` is the net winnings (`stake × odds − stake`) for a
/// winning bet and zero for a losing one. `chain` is the owner's ancestor
/// chain from immediate parent to root, as returned by
/// [`crate::HierarchyDirectory::chain_of`].
///
/// Postcondition, checked before returning: over the returned lines,
/// `Σ credits − Σ debits == stake` exactly.
///
/// # Errors
/// - `BrokenHierarchy` if the chain is empty (every bettor has at least
///   the platform root above it).
/// - `CommissionOverflow` if configured rates would extract more than the
///   money in play.
/// - `CascadeImbalance` if the postcondition fails.
pub fn distribute(
    bet: &Bet,
    outcome_amount: Decimal,
    chain: &[AccountNode],
) -> Result<Vec<CascadeLine>> {
    let Some(root) = chain.last() else {
        return Err(WagerbookError::BrokenHierarchy {
            user_id: bet.user_id,
            reason: "bet owner has no ancestor chain".to_string(),
        });
    };
    if outcome_amount.is_sign_negative() {
        return Err(WagerbookError::Internal(format!(
            "negative outcome amount {outcome_amount} for bet {}",
            bet.id
        )));
    }
    let won = !outcome_amount.is_zero();
    let hundred = Decimal::new(100, 0);

    // Per-level commission, rounded half-up to the currency unit.
    let mut commissions = Vec::with_capacity(chain.len());
    let mut total_commission = Decimal::ZERO;
    for node in chain {
        let amount = match node.profile.plan_for(bet.category) {
            CommissionPlan::NoCommission => Decimal::ZERO,
            CommissionPlan::PercentageOfStake { rate } => {
                round_money(bet.stake * *rate / hundred)
            }
            CommissionPlan::PercentageOfWinnings { rate } => {
                round_money(outcome_amount.max(Decimal::ZERO) * *rate / hundred)
            }
        };
        if amount.is_sign_negative() {
            return Err(WagerbookError::CommissionOverflow {
                user_id: node.user_id,
                reason: format!("negative commission {amount} from configured rate"),
            });
        }
        total_commission += amount;
        commissions.push(amount);
    }

    // Config fault: commission must never extract more than the money in play.
    let pool = if won {
        bet.stake + outcome_amount
    } else {
        bet.stake
    };
    if total_commission > pool {
        return Err(WagerbookError::CommissionOverflow {
            user_id: bet.user_id,
            reason: format!("total commission {total_commission} exceeds pool {pool}"),
        });
    }

    let mut lines = Vec::with_capacity(chain.len() + 2);

    // Owner principal: stake returned plus winnings, net of commission.
    if won {
        let owner_credit = bet.stake + outcome_amount - total_commission;
        if !owner_credit.is_zero() {
            lines.push(CascadeLine::credit(
                bet.user_id,
                LedgerCategory::BetWon,
                owner_credit,
                &format!("won {} @ {}", bet.selection, bet.odds),
            ));
        }
    }

    // Ancestor commissions, root included.
    for (node, amount) in chain.iter().zip(&commissions) {
        if amount.is_zero() {
            continue;
        }
        lines.push(CascadeLine::credit(
            node.user_id,
            LedgerCategory::Commission,
            *amount,
            &format!("commission for {}", node.code),
        ));
    }

    // Root balancing line. The tagged cascade (placement debit included)
    // must sum to zero, so the root nets exactly `stake − credits so far`;
    // rounding residue from the per-level commissions lands here.
    let credited: Decimal = lines.iter().map(|l| l.credit).sum();
    let net_root = bet.stake - credited;
    if !net_root.is_zero() {
        if net_root.is_sign_negative() {
            lines.push(CascadeLine::debit(
                root.user_id,
                LedgerCategory::SettlementFunding,
                -net_root,
                "net payout funding",
            ));
        } else {
            lines.push(CascadeLine::credit(
                root.user_id,
                if won {
                    LedgerCategory::SettlementFunding
                } else {
                    LedgerCategory::BetLost
                },
                net_root,
                if won { "net payout surplus" } else { "lost stake collected" },
            ));
        }
    }

    // Postcondition: the returned lines offset the placement debit exactly.
    let credits: Decimal = lines.iter().map(|l| l.credit).sum();
    let debits: Decimal = lines.iter().map(|l| l.debit).sum();
    if credits - debits != bet.stake {
        return Err(WagerbookError::CascadeImbalance {
            bet_id: bet.id,
            credits,
            debits,
        });
    }
    Ok(lines)
}
