//! # Register Session Model
//!
//! One open-to-close lifecycle of a cash drawer at a location.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Register Session Lifecycle                           │
//! │                                                                         │
//! │  open(location, opening_cash)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OPEN ──► record_sale_event(event_id, method, amount)                   │
//! │       │        cash   → total_cash                                      │
//! │       │        card   → total_card_slips                                │
//! │       │        cheque → total_cheques                                   │
//! │       ├─► record_refund(amount)   → total_refunds                       │
//! │       ├─► record_expense(amount)  → total_expenses                      │
//! │       ▼                                                                 │
//! │  close(closing_cash, note)                                              │
//! │       expected = opening + cash − refunds − expenses                    │
//! │       variance = closing − expected                                     │
//! │       ▼                                                                 │
//! │  CLOSED (terminal; the close summary is an immutable audit fact)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sale events are keyed by a unique payment-event id and recorded at
//! most once, so a retried POS call cannot double-count a payment into
//! the drawer. A failed operation leaves the accumulators untouched.
//!
//! This module is the pure math; the one-open-session-per-location
//! invariant and locking live in `till-engine`'s register manager.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ts_rs::TS;

use crate::error::{ArithmeticGuardError, CoreResult, EngineError};
use crate::money::Money;
use crate::types::PaymentMethod;

// =============================================================================
// Accumulators
// =============================================================================

/// Running totals of one session, by tender and outflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAccumulators {
    pub total_cash: Money,
    pub total_card_slips: Money,
    pub total_cheques: Money,
    pub total_refunds: Money,
    pub total_expenses: Money,
}

// =============================================================================
// Sale Event Receipt
// =============================================================================

/// Outcome of recording one sale-payment event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleEventReceipt {
    /// First time this payment-event id was seen; accumulators updated.
    Recorded,
    /// Replay of an already-recorded id; accumulators untouched.
    Duplicate,
}

// =============================================================================
// Register Session
// =============================================================================

/// One cash-drawer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSession {
    pub id: String,
    pub location: String,
    #[ts(as = "String")]
    pub open_time: DateTime<Utc>,
    /// `None` while the session is open.
    #[ts(as = "Option<String>")]
    pub close_time: Option<DateTime<Utc>>,
    pub opening_cash: Money,
    pub totals: RegisterAccumulators,
    pub closing_cash: Option<Money>,
    pub closing_note: Option<String>,
    /// Set exactly once, at close.
    pub variance: Option<Money>,

    /// Payment-event ids already routed into this session.
    recorded_events: BTreeSet<String>,
}

impl RegisterSession {
    /// Opens a new session with all accumulators at zero.
    pub fn open(
        id: impl Into<String>,
        location: impl Into<String>,
        opening_cash: Money,
        open_time: DateTime<Utc>,
    ) -> CoreResult<Self> {
        if opening_cash.is_negative() {
            return Err(ArithmeticGuardError::NegativeRegisterAmount {
                minor: opening_cash.minor(),
            }
            .into());
        }

        Ok(RegisterSession {
            id: id.into(),
            location: location.into(),
            open_time,
            close_time: None,
            opening_cash,
            totals: RegisterAccumulators::default(),
            closing_cash: None,
            closing_note: None,
            variance: None,
            recorded_events: BTreeSet::new(),
        })
    }

    /// Whether the session is still trading.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.close_time.is_none()
    }

    /// Routes one finalized sale-payment leg into the matching
    /// accumulator. Idempotent per `payment_event_id`: replays return
    /// [`SaleEventReceipt::Duplicate`] and change nothing.
    pub fn record_sale_event(
        &mut self,
        payment_event_id: &str,
        method: PaymentMethod,
        amount: Money,
    ) -> CoreResult<SaleEventReceipt> {
        self.ensure_open()?;
        guard_amount(amount)?;

        if self.recorded_events.contains(payment_event_id) {
            return Ok(SaleEventReceipt::Duplicate);
        }

        match method {
            PaymentMethod::Cash => self.totals.total_cash += amount,
            PaymentMethod::Card => self.totals.total_card_slips += amount,
            PaymentMethod::Cheque => self.totals.total_cheques += amount,
        }
        self.recorded_events.insert(payment_event_id.to_string());

        Ok(SaleEventReceipt::Recorded)
    }

    /// Adds a refund paid out of the drawer.
    pub fn record_refund(&mut self, amount: Money) -> CoreResult<()> {
        self.ensure_open()?;
        guard_amount(amount)?;
        self.totals.total_refunds += amount;
        Ok(())
    }

    /// Adds an expense paid out of the drawer.
    pub fn record_expense(&mut self, amount: Money) -> CoreResult<()> {
        self.ensure_open()?;
        guard_amount(amount)?;
        self.totals.total_expenses += amount;
        Ok(())
    }

    /// The cash the drawer should contain right now:
    /// `opening + cash sales − refunds − expenses`.
    ///
    /// Card slips and cheques never sit in the drawer, so they do not
    /// participate.
    pub fn expected_cash(&self) -> Money {
        self.opening_cash + self.totals.total_cash
            - self.totals.total_refunds
            - self.totals.total_expenses
    }

    /// Closes the session and computes the variance between counted and
    /// expected cash. Terminal: closing an already-closed session fails
    /// and changes nothing.
    pub fn close(
        &mut self,
        closing_cash: Money,
        closing_note: Option<String>,
        close_time: DateTime<Utc>,
    ) -> CoreResult<RegisterCloseSummary> {
        self.ensure_open()?;
        guard_amount(closing_cash)?;

        let expected_cash = self.expected_cash();
        let variance = closing_cash - expected_cash;

        self.close_time = Some(close_time);
        self.closing_cash = Some(closing_cash);
        self.closing_note = closing_note.clone();
        self.variance = Some(variance);

        Ok(RegisterCloseSummary {
            session_id: self.id.clone(),
            location: self.location.clone(),
            open_time: self.open_time,
            close_time,
            opening_cash: self.opening_cash,
            totals: self.totals,
            expected_cash,
            closing_cash,
            variance,
            closing_note,
        })
    }

    fn ensure_open(&self) -> CoreResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(EngineError::AlreadyClosed {
                session_id: self.id.clone(),
            })
        }
    }
}

fn guard_amount(amount: Money) -> CoreResult<()> {
    if amount.is_negative() {
        return Err(ArithmeticGuardError::NegativeRegisterAmount {
            minor: amount.minor(),
        }
        .into());
    }
    Ok(())
}

// =============================================================================
// Close Summary
// =============================================================================

/// The immutable audit fact produced when a session closes.
///
/// Variance is reported, never used to auto-correct any downstream
/// total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCloseSummary {
    pub session_id: String,
    pub location: String,
    #[ts(as = "String")]
    pub open_time: DateTime<Utc>,
    #[ts(as = "String")]
    pub close_time: DateTime<Utc>,
    pub opening_cash: Money,
    pub totals: RegisterAccumulators,
    pub expected_cash: Money,
    pub closing_cash: Money,
    /// `closing_cash − expected_cash`; negative means the drawer is short.
    pub variance: Money,
    pub closing_note: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
