//! # Register Manager
//!
//! The one piece of shared mutable state in Till: register sessions,
//! at most one open per location.
//!
//! ## Thread Safety
//! All sessions live behind a single `Mutex`, so the open-session
//! invariant and every accumulator update are serialized:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two POS lanes, same open session:                                      │
//! │                                                                         │
//! │  lane A: lock ── read total_cash ── add 50.00 ── write ── unlock        │
//! │  lane B:             (blocked)                    lock ── add 30.00     │
//! │                                                                         │
//! │  The read-modify-write happens entirely under the lock; concurrent      │
//! │  sale events can never both read the same total_cash and lose an        │
//! │  update.                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sessions mutate through closures under the lock, the same discipline
//! as every other managed state in the app. Operations are short pure
//! math, so one plain `Mutex` is enough; no RwLock, no async.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use till_core::error::{CoreResult, EngineError};
use till_core::money::Money;
use till_core::register::{RegisterCloseSummary, RegisterSession, SaleEventReceipt};
use till_core::types::PaymentMethod;
use till_core::validation::validate_location;

/// Sessions under management: open ones keyed by location, plus the
/// close-summary history kept as audit facts.
#[derive(Debug, Default)]
struct Registers {
    open: HashMap<String, RegisterSession>,
    closed: Vec<RegisterCloseSummary>,
}

/// Manages register sessions across locations.
#[derive(Debug, Default)]
pub struct RegisterManager {
    registers: Mutex<Registers>,
}

impl RegisterManager {
    pub fn new() -> Self {
        RegisterManager::default()
    }

    /// Opens a register at a location.
    ///
    /// ## Errors
    /// [`EngineError::Conflict`] when the location already has an open
    /// session - a location may have many sequential sessions, never two
    /// open ones concurrently.
    pub fn open(&self, location: &str, opening_cash: Money) -> CoreResult<RegisterSession> {
        validate_location(location)?;

        let mut registers = self.lock();
        if let Some(existing) = registers.open.get(location) {
            return Err(EngineError::Conflict {
                location: location.to_string(),
                session_id: existing.id.clone(),
            });
        }

        let session = RegisterSession::open(
            Uuid::new_v4().to_string(),
            location,
            opening_cash,
            Utc::now(),
        )?;
        info!(session_id = %session.id, %location, opening_cash = %opening_cash, "register opened");

        registers.open.insert(location.to_string(), session.clone());
        Ok(session)
    }

    /// Routes one finalized sale-payment leg into its session.
    /// Idempotent per `payment_event_id`; see [`RegisterSession`].
    pub fn record_sale_event(
        &self,
        session_id: &str,
        payment_event_id: &str,
        method: PaymentMethod,
        amount: Money,
    ) -> CoreResult<SaleEventReceipt> {
        let receipt = self.with_open_session(session_id, |session| {
            session.record_sale_event(payment_event_id, method, amount)
        })?;
        if receipt == SaleEventReceipt::Duplicate {
            debug!(%session_id, %payment_event_id, "duplicate sale event ignored");
        }
        Ok(receipt)
    }

    /// Adds a refund paid out of the session's drawer.
    pub fn record_refund(&self, session_id: &str, amount: Money) -> CoreResult<()> {
        self.with_open_session(session_id, |session| session.record_refund(amount))
    }

    /// Adds an expense paid out of the session's drawer.
    pub fn record_expense(&self, session_id: &str, amount: Money) -> CoreResult<()> {
        self.with_open_session(session_id, |session| session.record_expense(amount))
    }

    /// Closes a session, archiving its immutable close summary.
    ///
    /// ## Errors
    /// [`EngineError::AlreadyClosed`] for a session that has been closed
    /// before; [`EngineError::SessionNotFound`] for an unknown id. A
    /// failed close leaves the session open with accumulators intact.
    pub fn close(
        &self,
        session_id: &str,
        closing_cash: Money,
        closing_note: Option<String>,
    ) -> CoreResult<RegisterCloseSummary> {
        let mut registers = self.lock();

        let location = registers
            .open
            .iter()
            .find(|(_, session)| session.id == session_id)
            .map(|(location, _)| location.clone());

        let Some(location) = location else {
            return Err(Self::missing_session_error(&registers, session_id));
        };

        // Close in place first; only a successful close removes the
        // session from the open map.
        let summary = registers
            .open
            .get_mut(&location)
            .ok_or_else(|| EngineError::SessionNotFound {
                session_id: session_id.to_string(),
            })?
            .close(closing_cash, closing_note, Utc::now())?;

        registers.open.remove(&location);
        info!(
            %session_id,
            %location,
            variance = %summary.variance,
            "register closed"
        );
        registers.closed.push(summary.clone());
        Ok(summary)
    }

    /// The open session at a location, if any.
    pub fn open_session(&self, location: &str) -> Option<RegisterSession> {
        self.lock().open.get(location).cloned()
    }

    /// Close summaries for a location, oldest first.
    pub fn close_history(&self, location: &str) -> Vec<RegisterCloseSummary> {
        self.lock()
            .closed
            .iter()
            .filter(|summary| summary.location == location)
            .cloned()
            .collect()
    }

    fn with_open_session<F, R>(&self, session_id: &str, f: F) -> CoreResult<R>
    where
        F: FnOnce(&mut RegisterSession) -> CoreResult<R>,
    {
        let mut registers = self.lock();
        match registers
            .open
            .values_mut()
            .find(|session| session.id == session_id)
        {
            Some(session) => f(session),
            None => Err(Self::missing_session_error(&registers, session_id)),
        }
    }

    /// Distinguishes "closed" from "never existed" for error reporting.
    fn missing_session_error(registers: &Registers, session_id: &str) -> EngineError {
        if registers
            .closed
            .iter()
            .any(|summary| summary.session_id == session_id)
        {
            EngineError::AlreadyClosed {
                session_id: session_id.to_string(),
            }
        } else {
            EngineError::SessionNotFound {
                session_id: session_id.to_string(),
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registers> {
        self.registers.lock().expect("register mutex poisoned")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn one_open_session_per_location() {
        let manager = RegisterManager::new();
        let first = manager.open("main-store", Money::from_minor(10_000)).unwrap();

        let err = manager.open("main-store", Money::from_minor(0)).unwrap_err();
        assert!(matches!(err, EngineError::Conflict { ref session_id, .. } if *session_id == first.id));

        // A different location is unaffected
        assert!(manager.open("branch-2", Money::zero()).is_ok());
    }

    #[test]
    fn sequential_sessions_after_close() {
        let manager = RegisterManager::new();
        let first = manager.open("main-store", Money::from_minor(10_000)).unwrap();
        manager.close(&first.id, Money::from_minor(10_000), None).unwrap();

        let second = manager.open("main-store", Money::from_minor(5_000)).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(manager.close_history("main-store").len(), 1);
    }

    #[test]
    fn closing_twice_reports_already_closed() {
        let manager = RegisterManager::new();
        let session = manager.open("main-store", Money::zero()).unwrap();
        manager.close(&session.id, Money::zero(), None).unwrap();

        let err = manager.close(&session.id, Money::zero(), None).unwrap_err();
        assert!(matches!(err, EngineError::AlreadyClosed { .. }));

        let err = manager
            .record_sale_event(&session.id, "pay-1", PaymentMethod::Cash, Money::from_minor(1))
            .unwrap_err();
        assert!(matches!(err, EngineError::AlreadyClosed { .. }));
    }

    #[test]
    fn unknown_session_is_not_found() {
        let manager = RegisterManager::new();
        let err = manager
            .record_refund("no-such-session", Money::from_minor(1))
            .unwrap_err();
        assert!(matches!(err, EngineError::SessionNotFound { .. }));
    }

    #[test]
    fn concurrent_sale_events_never_lose_updates() {
        let manager = Arc::new(RegisterManager::new());
        let session = manager.open("main-store", Money::zero()).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let manager = Arc::clone(&manager);
                let session_id = session.id.clone();
                thread::spawn(move || {
                    for event in 0..50 {
                        manager
                            .record_sale_event(
                                &session_id,
                                &format!("pay-{worker}-{event}"),
                                PaymentMethod::Cash,
                                Money::from_minor(100),
                            )
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let open = manager.open_session("main-store").unwrap();
        assert_eq!(open.totals.total_cash.minor(), 8 * 50 * 100);
    }

    #[test]
    fn replayed_event_across_threads_counts_once() {
        let manager = Arc::new(RegisterManager::new());
        let session = manager.open("main-store", Money::zero()).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let manager = Arc::clone(&manager);
                let session_id = session.id.clone();
                thread::spawn(move || {
                    manager
                        .record_sale_event(
                            &session_id,
                            "pay-shared",
                            PaymentMethod::Cash,
                            Money::from_minor(500),
                        )
                        .unwrap()
                })
            })
            .collect();

        let receipts: Vec<SaleEventReceipt> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        let recorded = receipts
            .iter()
            .filter(|r| **r == SaleEventReceipt::Recorded)
            .count();
        assert_eq!(recorded, 1);

        let open = manager.open_session("main-store").unwrap();
        assert_eq!(open.totals.total_cash.minor(), 500);
    }
}
