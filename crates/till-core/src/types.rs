//! # Domain Types
//!
//! The settlement domain model. Statuses, payment methods and the
//! walk-in customer are closed enums, never free-form strings, so
//! invalid states are unrepresentable.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────────┐  │
//! │  │    Document     │   │    LineItem     │   │  CommissionProfile   │  │
//! │  │  ─────────────  │   │  ─────────────  │   │  ──────────────────  │  │
//! │  │  kind           │   │  product_id     │   │  entity              │  │
//! │  │  lines          │   │  quantity       │   │  overall_rate        │  │
//! │  │  order_discount │   │  unit_price     │   │  category_rates      │  │
//! │  │  order_tax_rate │   │  line_discount  │   └──────────────────────┘  │
//! │  │  shipping       │   │  line_tax_rate  │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  DocumentKind {Sale, Draft, Quotation, Purchase}                        │
//! │  PaymentStatus {Paid, Due, Partial}     ← derived, never an input       │
//! │  PaymentMethod {Cash, Card, Cheque}                                     │
//! │  Customer {WalkIn, Registered}          ← no sentinel strings           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::money::{Money, Quantity, Rate};

// =============================================================================
// Document Kind & Payment Status
// =============================================================================

/// The kind of a sales/purchase document.
///
/// Every kind settles through the same totals calculator; kind only
/// matters for which aggregates a document feeds (drafts and quotations
/// never reach the profit report).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Finalized sale.
    Sale,
    /// In-progress sale, financial fields still mutable.
    Draft,
    /// Quotation, never counted in any aggregate.
    Quotation,
    /// Supplier purchase.
    Purchase,
}

/// Payment status, derived from payments received vs total payable.
///
/// Derived only - callers never supply it, [`crate::totals::compute_totals`]
/// computes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment due is zero.
    Paid,
    /// Nothing received yet.
    Due,
    /// Something received, something still due.
    Partial,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a payment leg was tendered. Routes the amount into the matching
/// register accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash - the only method counted into expected drawer cash.
    Cash,
    /// Card slip.
    Card,
    /// Cheque.
    Cheque,
}

// =============================================================================
// Order Discount
// =============================================================================

/// A document-level discount, applied to the items subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "amount", rename_all = "snake_case")]
pub enum OrderDiscount {
    /// A fixed amount off the subtotal.
    Fixed(Money),
    /// A percentage of the subtotal.
    Percentage(Rate),
}

// =============================================================================
// Customer
// =============================================================================

/// The customer on a document.
///
/// The legacy "walk-in customer" sentinel record becomes an explicit
/// variant instead of a magic id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Customer {
    /// Anonymous counter sale.
    WalkIn,
    /// A known contact.
    Registered { id: String, name: String },
}

impl Customer {
    /// Grouping key for the customer profit dimension.
    pub fn key(&self) -> String {
        match self {
            Customer::WalkIn => "walk-in".to_string(),
            Customer::Registered { id, .. } => id.clone(),
        }
    }
}

// =============================================================================
// Line Item & Document
// =============================================================================

/// One line of a document.
///
/// Owned exclusively by its parent document; immutable once the document
/// is finalized. Prices are snapshots taken when the line was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Product this line sells (may reference a since-deleted product).
    pub product_id: String,

    /// Quantity in milli-units (fractional for weighable products).
    pub quantity: Quantity,

    /// Unit sell price at time of sale (frozen).
    pub unit_price: Money,

    /// Flat discount on this line, applied before line tax.
    pub line_discount: Money,

    /// Tax rate on this line's net.
    pub line_tax_rate: Rate,
}

impl LineItem {
    /// A plain line with no line-level discount or tax.
    pub fn simple(product_id: impl Into<String>, quantity: Quantity, unit_price: Money) -> Self {
        LineItem {
            product_id: product_id.into(),
            quantity,
            unit_price,
            line_discount: Money::zero(),
            line_tax_rate: Rate::zero(),
        }
    }
}

/// Chain of commission entities attached to a document, used by the
/// agent-tier profit dimensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AgentChain {
    pub agent_id: Option<String>,
    pub sub_agent_id: Option<String>,
    pub company_id: Option<String>,
}

/// A sales/purchase document.
///
/// Financial fields are immutable after finalization; only the payment
/// status moves as new payments arrive, and status is always re-derived
/// from `payments_received`, never stored as an input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Document {
    pub id: String,
    pub kind: DocumentKind,
    pub customer: Customer,

    /// Document date, compared with calendar-day semantics in reports.
    #[ts(as = "String")]
    pub dated: NaiveDate,

    /// Business location the document belongs to.
    pub location_id: String,

    /// Staff member who created the document.
    pub staff_id: Option<String>,

    /// Commission entities attached to the document, if any.
    pub agent_chain: AgentChain,

    /// Ordered line items.
    pub lines: Vec<LineItem>,

    /// Document-level discount, if any.
    pub order_discount: Option<OrderDiscount>,

    /// Tax applied to the post-discount subtotal.
    pub order_tax_rate: Rate,

    /// Shipping charge added after tax.
    pub shipping_charge: Money,

    /// Total received across all payment legs.
    pub payments_received: Money,
}

// =============================================================================
// Product & Category
// =============================================================================

/// Product metadata joined into profit reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    pub name: String,

    /// Category, if assigned. Drives commission category rates and the
    /// category profit dimension.
    pub category_id: Option<String>,

    /// Brand label, if any.
    pub brand: Option<String>,

    /// Latest purchase (cost) price.
    pub purchase_price: Money,

    /// Default sell price.
    pub sell_price: Money,
}

/// A node of the product category forest.
///
/// `parent_id` is a raw pointer into the same collection; the source
/// system never guaranteed acyclicity, so [`crate::commission::CategoryIndex`]
/// validates the forest before any lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductCategory {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
}

// =============================================================================
// Commission Profile
// =============================================================================

/// The kind of entity a commission profile belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CommissionEntity {
    Agent,
    SubAgent,
    Company,
    Salesperson,
}

impl CommissionEntity {
    /// Agents and sub-agents run in "advanced commission" mode, which
    /// requires per-category rates.
    pub const fn requires_category_rates(&self) -> bool {
        matches!(self, CommissionEntity::Agent | CommissionEntity::SubAgent)
    }

    /// Stable label used in error messages and report headers.
    pub const fn label(&self) -> &'static str {
        match self {
            CommissionEntity::Agent => "agent",
            CommissionEntity::SubAgent => "sub-agent",
            CommissionEntity::Company => "company",
            CommissionEntity::Salesperson => "salesperson",
        }
    }
}

/// A commission rate structure for one entity.
///
/// Category rates override the overall rate per line, exact category
/// match only; the overall rate is the fallback for unmatched lines.
/// The two are never summed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommissionProfile {
    pub id: String,
    pub entity: CommissionEntity,

    /// Fallback rate when no category rate matches a line.
    pub overall_rate: Option<Rate>,

    /// Per-category override rates, keyed by category id.
    /// BTreeMap keeps iteration deterministic for breakdowns.
    pub category_rates: BTreeMap<String, Rate>,
}

// =============================================================================
// Expense Record
// =============================================================================

/// An expense, fed into register sessions and the P&L summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpenseRecord {
    pub id: String,
    #[ts(as = "String")]
    pub dated: NaiveDate,
    pub location_id: String,
    pub amount: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
