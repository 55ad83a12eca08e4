//! Append-only ledger store with per-user write serialization.
//!
//! The store is the source of truth for all balance state. Each user has an
//! independent log guarded by its own mutex, so appends for one user are
//! linearizable (two concurrent appends can never read the same "last
//! balance" and diverge) while different users never contend. The outer map
//! lock is held only long enough to clone out a per-user handle.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use wagerbook_types::{
    BetId, EntryId, LedgerCategory, LedgerEntry, Result, UserId, WagerbookError, constants,
    money::round_money,
};

/// Time-range filter for [`LedgerStore::history`]. Bounds are inclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl HistoryRange {
    /// The unbounded range.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at <= to)
    }
}

/// One user's append-only log. Entries are in creation order; the last
/// entry's snapshot is the current balance.
#[derive(Debug, Default)]
struct UserLog {
    entries: Vec<LedgerEntry>,
}

impl UserLog {
    fn balance(&self) -> Decimal {
        self.entries
            .last()
            .map_or(Decimal::ZERO, |e| e.balance_after)
    }
}

/// Append-only, per-user financial log.
///
/// Past entries are never mutated or deleted; corrections are new
/// offsetting entries appended through the same path as everything else.
pub struct LedgerStore {
    logs: RwLock<HashMap<UserId, Arc<Mutex<UserLog>>>>,
}

impl LedgerStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            logs: RwLock::new(HashMap::new()),
        }
    }

    /// Clone out the per-user log handle, creating it on first touch.
    fn log_handle(&self, user_id: UserId) -> Arc<Mutex<UserLog>> {
        if let Some(handle) = self.logs.read().get(&user_id) {
            return Arc::clone(handle);
        }
        let mut logs = self.logs.write();
        Arc::clone(logs.entry(user_id).or_default())
    }

    /// Append one entry and return it with its balance snapshot.
    ///
    /// Amounts are rounded to the smallest currency unit before being
    /// written. Exactly one of `credit` / `debit` must be positive.
    ///
    /// # Errors
    /// Returns `MalformedEntry` if both or neither side is non-zero, or if
    /// either side is negative.
    pub fn append(
        &self,
        user_id: UserId,
        category: LedgerCategory,
        credit: Decimal,
        debit: Decimal,
        bet_id: Option<BetId>,
        remark: &str,
    ) -> Result<LedgerEntry> {
        let credit = round_money(credit);
        let debit = round_money(debit);
        if credit.is_sign_negative() || debit.is_sign_negative() {
            return Err(WagerbookError::MalformedEntry {
                reason: format!("negative amount: credit {credit}, debit {debit}"),
            });
        }
        if credit.is_zero() == debit.is_zero() {
            return Err(WagerbookError::MalformedEntry {
                reason: format!(
                    "exactly one side must be non-zero: credit {credit}, debit {debit}"
                ),
            });
        }

        let remark: String = if remark.len() > constants::MAX_REMARK_LEN {
            remark.chars().take(constants::MAX_REMARK_LEN).collect()
        } else {
            remark.to_string()
        };

        let handle = self.log_handle(user_id);
        let mut log = handle.lock();
        let balance_after = log.balance() + credit - debit;
        let entry = LedgerEntry {
            id: EntryId::new(),
            user_id,
            category,
            credit,
            debit,
            balance_after,
            bet_id,
            remark,
            created_at: Utc::now(),
        };
        log.entries.push(entry.clone());

        tracing::debug!(
            user = %user_id,
            category = %category,
            credit = %credit,
            debit = %debit,
            balance = %balance_after,
            bet = ?bet_id.map(|b| b.to_string()),
            "Ledger entry appended"
        );
        Ok(entry)
    }

    /// Current balance: the most recent entry's snapshot, or zero.
    #[must_use]
    pub fn balance_of(&self, user_id: UserId) -> Decimal {
        let Some(handle) = self.logs.read().get(&user_id).cloned() else {
            return Decimal::ZERO;
        };
        let log = handle.lock();
        log.balance()
    }

    /// Entries for a user within `range`, ordered by creation time
    /// ascending. Returns a fresh snapshot on every call, so the read is
    /// restartable.
    #[must_use]
    pub fn history(&self, user_id: UserId, range: HistoryRange) -> Vec<LedgerEntry> {
        let Some(handle) = self.logs.read().get(&user_id).cloned() else {
            return Vec::new();
        };
        let log = handle.lock();
        log.entries
            .iter()
            .filter(|e| range.contains(e.created_at))
            .cloned()
            .collect()
    }

    /// Every entry across all users tagged with `bet_id`, ordered by
    /// creation time ascending. Audit/reporting path — walks all logs.
    #[must_use]
    pub fn entries_for_bet(&self, bet_id: BetId) -> Vec<LedgerEntry> {
        let handles: Vec<_> = self.logs.read().values().cloned().collect();
        let mut entries: Vec<LedgerEntry> = handles
            .iter()
            .flat_map(|handle| {
                let log = handle.lock();
                log.entries
                    .iter()
                    .filter(|e| e.bet_id == Some(bet_id))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
        entries.sort_by_key(|e| (e.created_at, e.id));
        entries
    }

    /// Number of entries across all users.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.logs
            .read()
            .values()
            .map(|handle| handle.lock().entries.len())
            .sum()
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new()
    }
}
