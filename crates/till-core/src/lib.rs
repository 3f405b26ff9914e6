//! # till-core: Pure Settlement Logic for Till
//!
//! The heart of the Till back office: every place the system genuinely
//! computes something - document settlement, commission resolution,
//! register reconciliation, profit aggregation - lives here as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Till Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │           Back-office pages / POS (excluded from repo)          │   │
//! │  │    sale form ─ drafts ─ quotations ─ reports ─ register UI      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    till-engine (facade)                         │   │
//! │  │    register manager • record store seam • orchestration         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌────────┐ ┌────────┐ ┌────────────┐ ┌──────────┐ ┌────────┐ │   │
//! │  │   │ money  │ │ totals │ │ commission │ │ register │ │ profit │ │   │
//! │  │   └────────┘ └────────┘ └────────────┘ └──────────┘ └────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money/Rate/Quantity primitives and exact intermediates
//! - [`types`] - Domain types (Document, LineItem, CommissionProfile, ...)
//! - [`error`] - The settlement error taxonomy
//! - [`validation`] - Field-level validation
//! - [`totals`] - Document Totals Calculator
//! - [`commission`] - Commission Resolver and the category index
//! - [`register`] - Register session math (open → trading → close)
//! - [`profit`] - Profit/Loss Aggregator and P&L summary
//! - [`config`] - Currency precision, rounding, date presets
//! - [`report`] - Export row shaping
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output - callers persist results
//! 2. **No I/O**: records are fetched by collaborators and passed in
//! 3. **Integer Money**: minor units, exact intermediates, one final
//!    half-up rounding per output field
//! 4. **Explicit Errors**: typed taxonomy, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::money::{Money, Quantity, Rate};
//! use till_core::totals::compute_totals;
//! use till_core::types::{LineItem, OrderDiscount};
//!
//! let lines = vec![LineItem::simple("p1", Quantity::from_units(2), Money::from_minor(1000))];
//! let totals = compute_totals(
//!     &lines,
//!     Some(OrderDiscount::Percentage(Rate::from_bps(1000))),
//!     Rate::from_bps(500),
//!     Money::from_minor(300),
//!     Money::zero(),
//! )
//! .unwrap();
//!
//! // 20.00 − 10% = 18.00, + 5% tax = 18.90, + 3.00 shipping = 21.90
//! assert_eq!(totals.total_payable.minor(), 2190);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod commission;
pub mod config;
pub mod error;
pub mod money;
pub mod profit;
pub mod register;
pub mod report;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use till_core::Money` instead of
// `use till_core::money::Money`

pub use commission::{resolve_commission, CategoryIndex, CommissionOutcome};
pub use config::{DatePreset, DateRange, EngineConfig};
pub use error::{ArithmeticGuardError, CoreResult, EngineError, ValidationError};
pub use money::{CurrencyPrecision, Money, Quantity, Rate, RoundingMode};
pub use profit::{aggregate_profit, Dimension, ProfitReportRow, ProfitSummary, SummaryInputs};
pub use register::{RegisterCloseSummary, RegisterSession, SaleEventReceipt};
pub use totals::{compute_totals, DocumentTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines on a single document.
///
/// Prevents runaway documents; generous enough for wholesale invoices.
pub const MAX_DOCUMENT_LINES: usize = 500;

/// Maximum quantity of a single line, in milli-units (999 whole units).
///
/// Prevents accidental over-entry (typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY_MILLI: i64 = 999_000;

/// Maximum supported depth of the category forest.
///
/// Real catalogs are depth ≤ 2; a chain longer than this bound is
/// treated as a cycle and rejected at index build time.
pub const MAX_CATEGORY_DEPTH: usize = 16;
