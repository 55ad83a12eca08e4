//! Exposure tracker — race-free reservation of credit-limit capacity.
//!
//! Every open bet holds a reservation against its owner's credit limit.
//! Reservations are taken at placement and released exactly once at
//! resolution — but release tolerates duplicates, because resolution
//! events arrive at-least-once.
//!
//! Per-user state sits behind its own mutex: two concurrent reservations
//! for the same user serialize, so neither can pass a limit check the
//! other invalidates. Different users never contend.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use wagerbook_types::{MarketId, ReservationId, Result, UserId, WagerbookError};

/// One tracked reservation.
#[derive(Debug, Clone)]
struct Reservation {
    market_id: MarketId,
    liability: Decimal,
    released: bool,
}

/// Per-user exposure account: the credit limit and every reservation
/// taken against it.
#[derive(Debug, Default)]
struct ExposureAccount {
    credit_limit: Decimal,
    /// Running sum of unreleased liabilities.
    reserved: Decimal,
    reservations: HashMap<ReservationId, Reservation>,
}

/// Tracks open liability per user and enforces the credit-limit invariant
/// at reservation time: `exposure + liability ≤ credit_limit`, always.
pub struct ExposureTracker {
    accounts: RwLock<HashMap<UserId, Arc<Mutex<ExposureAccount>>>>,
    /// Reservation id → owning user, for release-by-id.
    owners: RwLock<HashMap<ReservationId, UserId>>,
}

impl ExposureTracker {
    /// Create a new empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            owners: RwLock::new(HashMap::new()),
        }
    }

    /// Set (or create) a user's credit limit. Lowering the limit below
    /// current exposure is allowed — no new reservations succeed until
    /// exposure drains back under it.
    pub fn set_credit_limit(&self, user_id: UserId, credit_limit: Decimal) {
        let handle = self.account_handle(user_id);
        let mut account = handle.lock();
        account.credit_limit = credit_limit;
    }

    /// Atomically check the limit and record a reservation.
    ///
    /// # Errors
    /// Returns `ExposureLimitExceeded` if the new liability would push
    /// exposure past the credit limit. A user with no account has a zero
    /// limit and fails the same way.
    pub fn reserve(
        &self,
        user_id: UserId,
        market_id: MarketId,
        liability: Decimal,
    ) -> Result<ReservationId> {
        if liability.is_sign_negative() {
            return Err(WagerbookError::Internal(format!(
                "negative liability {liability} for user {user_id}"
            )));
        }

        let handle = self.account_handle(user_id);
        let mut account = handle.lock();
        if account.reserved + liability > account.credit_limit {
            return Err(WagerbookError::ExposureLimitExceeded {
                current: account.reserved,
                requested: liability,
                limit: account.credit_limit,
            });
        }

        let reservation_id = ReservationId::new();
        account.reserved += liability;
        account.reservations.insert(
            reservation_id,
            Reservation {
                market_id,
                liability,
                released: false,
            },
        );
        drop(account);
        self.owners.write().insert(reservation_id, user_id);

        tracing::debug!(
            user = %user_id,
            market = %market_id,
            reservation = %reservation_id,
            liability = %liability,
            "Exposure reserved"
        );
        Ok(reservation_id)
    }

    /// Release a reservation, returning the liability it freed.
    ///
    /// Idempotent: releasing an already-released reservation is a
    /// warn-logged no-op returning zero, so at-least-once delivery of
    /// resolution events is safe.
    ///
    /// # Errors
    /// Returns `UnknownReservation` if the id was never issued.
    pub fn release(&self, reservation_id: ReservationId) -> Result<Decimal> {
        let user_id = self
            .owners
            .read()
            .get(&reservation_id)
            .copied()
            .ok_or(WagerbookError::UnknownReservation(reservation_id))?;

        let handle = self.account_handle(user_id);
        let mut account = handle.lock();
        let reservation = account
            .reservations
            .get_mut(&reservation_id)
            .ok_or(WagerbookError::UnknownReservation(reservation_id))?;

        if reservation.released {
            tracing::warn!(
                user = %user_id,
                reservation = %reservation_id,
                "Duplicate release ignored"
            );
            return Ok(Decimal::ZERO);
        }
        reservation.released = true;
        let liability = reservation.liability;
        account.reserved -= liability;

        tracing::debug!(
            user = %user_id,
            reservation = %reservation_id,
            liability = %liability,
            "Exposure released"
        );
        Ok(liability)
    }

    /// Current exposure: sum of unreleased liabilities. Zero for unknown
    /// users.
    #[must_use]
    pub fn exposure_of(&self, user_id: UserId) -> Decimal {
        let Some(handle) = self.accounts.read().get(&user_id).cloned() else {
            return Decimal::ZERO;
        };
        let account = handle.lock();
        account.reserved
    }

    /// The user's credit limit, if an account exists.
    #[must_use]
    pub fn credit_limit_of(&self, user_id: UserId) -> Option<Decimal> {
        let handle = self.accounts.read().get(&user_id).cloned()?;
        let account = handle.lock();
        Some(account.credit_limit)
    }

    /// Unreleased liability held on one market for a user.
    #[must_use]
    pub fn market_exposure_of(&self, user_id: UserId, market_id: MarketId) -> Decimal {
        let Some(handle) = self.accounts.read().get(&user_id).cloned() else {
            return Decimal::ZERO;
        };
        let account = handle.lock();
        account
            .reservations
            .values()
            .filter(|r| !r.released && r.market_id == market_id)
            .map(|r| r.liability)
            .sum()
    }

    fn account_handle(&self, user_id: UserId) -> Arc<Mutex<ExposureAccount>> {
        if let Some(handle) = self.accounts.read().get(&user_id) {
            return Arc::clone(handle);
        }
        let mut accounts = self.accounts.write();
        Arc::clone(accounts.entry(user_id).or_default())
    }
}

impl Default for ExposureTracker {
    fn default() -> Self {
        Self::new()
    }
}
