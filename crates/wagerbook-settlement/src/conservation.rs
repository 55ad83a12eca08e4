//! Cascade conservation — the zero-sum audit.
//!
//! Mathematical invariant enforced after every settled bet:
//! ```text
//! ∀ bet: Σ credits == Σ debits  over all entries tagged with the bet
//! ```
//! (placement debit included — the cascade is the full money trail of
//! one bet, and settlement only moves that money between ledger rows).
//!
//! If this invariant ever breaks, settlement halts with a critical alert.
//! This is the ultimate safety net behind the commission engine's own
//! postcondition.

use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use wagerbook_types::{BetId, LedgerEntry, Result, WagerbookError};

/// Verify that a bet's tagged entries conserve money exactly.
///
/// # Errors
/// Returns [`WagerbookError::CascadeImbalance`] if total credits and
/// debits differ.
pub fn verify_cascade(bet_id: BetId, entries: &[LedgerEntry]) -> Result<()> {
    let credits: Decimal = entries.iter().map(|e| e.credit).sum();
    let debits: Decimal = entries.iter().map(|e| e.debit).sum();
    if credits != debits {
        return Err(WagerbookError::CascadeImbalance {
            bet_id,
            credits,
            debits,
        });
    }
    Ok(())
}

/// Deterministic digest over a set of cascade entries, for settlement
/// reports and audit trails.
///
/// `SHA-256(domain_sep || count || for each entry: user || category ||
/// credit || debit)`, over entries in the order given. Two settlement
/// passes that wrote the same movements produce the same digest.
#[must_use]
pub fn cascade_digest(entries: &[LedgerEntry]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"wagerbook:cascade:v1:");
    hasher.update((entries.len() as u64).to_le_bytes());
    for entry in entries {
        hasher.update(entry.user_id.0.as_bytes());
        hasher.update(entry.category.to_string().as_bytes());
        hasher.update(entry.credit.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(entry.debit.to_string().as_bytes());
        hasher.update(b";");
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use wagerbook_types::{EntryId, LedgerCategory, UserId};

    use super::*;

    fn entry(user: UserId, category: LedgerCategory, credit: i64, debit: i64) -> LedgerEntry {
        LedgerEntry {
            id: EntryId::new(),
            user_id: user,
            category,
            credit: Decimal::new(credit, 0),
            debit: Decimal::new(debit, 0),
            balance_after: Decimal::ZERO,
            bet_id: Some(BetId::new()),
            remark: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn balanced_cascade_passes() {
        let bettor = UserId::new();
        let root = UserId::new();
        let entries = vec![
            entry(bettor, LedgerCategory::BetPlaced, 0, 100),
            entry(bettor, LedgerCategory::BetWon, 190, 0),
            entry(root, LedgerCategory::Commission, 10, 0),
            entry(root, LedgerCategory::SettlementFunding, 0, 100),
        ];
        verify_cascade(BetId::new(), &entries).unwrap();
    }

    #[test]
    fn imbalanced_cascade_fails() {
        let bettor = UserId::new();
        let entries = vec![
            entry(bettor, LedgerCategory::BetPlaced, 0, 100),
            entry(bettor, LedgerCategory::BetWon, 150, 0),
        ];
        let bet_id = BetId::new();
        let err = verify_cascade(bet_id, &entries).unwrap_err();
        assert!(matches!(
            err,
            WagerbookError::CascadeImbalance { bet_id: b, credits, debits }
                if b == bet_id
                    && credits == Decimal::new(150, 0)
                    && debits == Decimal::new(100, 0)
        ));
    }

    #[test]
    fn empty_cascade_is_trivially_balanced() {
        verify_cascade(BetId::new(), &[]).unwrap();
    }

    #[test]
    fn digest_is_deterministic_over_movements() {
        let user = UserId::new();
        let a = vec![entry(user, LedgerCategory::BetPlaced, 0, 100)];
        // Same user, category, and amounts — different entry ids and times.
        let b = vec![entry(user, LedgerCategory::BetPlaced, 0, 100)];
        assert_eq!(cascade_digest(&a), cascade_digest(&b));
    }

    #[test]
    fn digest_distinguishes_amounts() {
        let user = UserId::new();
        let a = vec![entry(user, LedgerCategory::BetPlaced, 0, 100)];
        let b = vec![entry(user, LedgerCategory::BetPlaced, 0, 101)];
        assert_ne!(cascade_digest(&a), cascade_digest(&b));
    }

    #[test]
    fn digest_distinguishes_order() {
        let user = UserId::new();
        let e1 = entry(user, LedgerCategory::Commission, 10, 0);
        let e2 = entry(user, LedgerCategory::BetLost, 90, 0);
        assert_ne!(
            cascade_digest(&[e1.clone(), e2.clone()]),
            cascade_digest(&[e2, e1])
        );
    }
}
