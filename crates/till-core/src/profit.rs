//! # Profit/Loss Aggregator
//!
//! Folds already-fetched sale documents into per-dimension profit rows,
//! and combines the whole-business ledger into a P&L summary.
//!
//! ## Aggregation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  documents (kind = Sale, dated inside range)                            │
//! │       │ flatten lines                                                   │
//! │       ▼                                                                 │
//! │  join product metadata ── missing product? skip line, warn, go on       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  group by dimension key                                                 │
//! │  Σ (unit_price − purchase_price) × quantity     per group, exact        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  rows: gross profit desc, ties by key asc                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Document-level adjustments (shipping, discounts, returns) are NOT
//! apportioned into per-product rows; they only appear in the
//! whole-business [`ProfitSummary`]. This mirrors how the report pages
//! have always read and must not silently change reported figures.
//!
//! Everything here is read-only and derived; nothing is authoritative
//! state.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;
use ts_rs::TS;

use crate::commission::CategoryIndex;
use crate::config::DateRange;
use crate::money::{Exact, Money};
use crate::types::{Customer, Document, DocumentKind, Product};

// =============================================================================
// Dimensions
// =============================================================================

/// The independent groupings a profit report can be sliced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Product,
    Category,
    Brand,
    Location,
    Invoice,
    Date,
    Customer,
    Weekday,
    Staff,
    Agent,
    SubAgent,
    Company,
}

impl Dimension {
    /// Report column header for the key column.
    pub const fn header(&self) -> &'static str {
        match self {
            Dimension::Product => "Product",
            Dimension::Category => "Category",
            Dimension::Brand => "Brand",
            Dimension::Location => "Location",
            Dimension::Invoice => "Invoice",
            Dimension::Date => "Date",
            Dimension::Customer => "Customer",
            Dimension::Weekday => "Day of Week",
            Dimension::Staff => "Staff",
            Dimension::Agent => "Agent",
            Dimension::SubAgent => "Sub-Agent",
            Dimension::Company => "Company",
        }
    }
}

// =============================================================================
// Report Row
// =============================================================================

/// One row of a dimensional profit report. Derived, never persisted as
/// authoritative state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProfitReportRow {
    /// Stable grouping key (product id, category id, date, ...).
    pub key: String,
    /// Human-readable label for the key.
    pub label: String,
    /// Signed gross profit of the group.
    pub gross_profit: Money,
}

// =============================================================================
// aggregate_profit
// =============================================================================

/// Aggregates per-line profit over one dimension.
///
/// Only finalized sales count; drafts, quotations and purchases never
/// reach a profit row. Lines whose product reference no longer resolves
/// are skipped with a warning - historical sales may reference deleted
/// products, and a report must still come out (best-effort policy,
/// deliberate). Lines that carry no key for the requested dimension
/// (no staff, no agent chain link) are skipped the same way.
pub fn aggregate_profit(
    dimension: Dimension,
    range: DateRange,
    documents: &[Document],
    products: &[Product],
    categories: &CategoryIndex,
) -> Vec<ProfitReportRow> {
    let by_product: HashMap<&str, &Product> =
        products.iter().map(|p| (p.id.as_str(), p)).collect();

    // key → (label, exact profit)
    let mut groups: BTreeMap<String, (String, Exact)> = BTreeMap::new();

    for document in documents {
        if document.kind != DocumentKind::Sale || !range.contains(document.dated) {
            continue;
        }

        for line in &document.lines {
            let Some(product) = by_product.get(line.product_id.as_str()) else {
                warn!(
                    document_id = %document.id,
                    product_id = %line.product_id,
                    "skipping line with unmatched product reference"
                );
                continue;
            };

            let Some((key, label)) = group_key(dimension, document, product, categories) else {
                warn!(
                    document_id = %document.id,
                    dimension = ?dimension,
                    "skipping line with no key for dimension"
                );
                continue;
            };

            let margin = line.unit_price - product.purchase_price;
            let profit = Exact::price_times_quantity(margin, line.quantity);

            let entry = groups.entry(key).or_insert((label, Exact::ZERO));
            entry.1 = entry.1 + profit;
        }
    }

    let mut rows: Vec<ProfitReportRow> = groups
        .into_iter()
        .map(|(key, (label, profit))| ProfitReportRow {
            key,
            label,
            gross_profit: profit.to_money(),
        })
        .collect();

    // Deterministic order: biggest earners first, ties by key.
    rows.sort_by(|a, b| {
        b.gross_profit
            .cmp(&a.gross_profit)
            .then_with(|| a.key.cmp(&b.key))
    });
    rows
}

/// The (key, label) a line lands in for a dimension, or `None` when the
/// document carries nothing for it.
fn group_key(
    dimension: Dimension,
    document: &Document,
    product: &Product,
    categories: &CategoryIndex,
) -> Option<(String, String)> {
    match dimension {
        Dimension::Product => Some((product.id.clone(), product.name.clone())),
        Dimension::Category => match product.category_id.as_deref() {
            Some(id) => {
                let label = categories
                    .get(id)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| id.to_string());
                Some((id.to_string(), label))
            }
            None => Some(("uncategorized".to_string(), "Uncategorized".to_string())),
        },
        Dimension::Brand => match product.brand.as_deref() {
            Some(brand) => Some((brand.to_string(), brand.to_string())),
            None => Some(("unbranded".to_string(), "Unbranded".to_string())),
        },
        Dimension::Location => Some((document.location_id.clone(), document.location_id.clone())),
        Dimension::Invoice => Some((document.id.clone(), document.id.clone())),
        Dimension::Date => {
            let date = document.dated.to_string();
            Some((date.clone(), date))
        }
        Dimension::Customer => {
            let label = match &document.customer {
                Customer::WalkIn => "Walk-in".to_string(),
                Customer::Registered { name, .. } => name.clone(),
            };
            Some((document.customer.key(), label))
        }
        Dimension::Weekday => {
            // Key with the ISO number so "1-Monday" sorts before "2-Tuesday"
            // on profit ties.
            let weekday = document.dated.format("%A").to_string();
            let number = document.dated.format("%u").to_string();
            Some((format!("{number}-{weekday}"), weekday))
        }
        Dimension::Staff => document.staff_id.clone().map(|id| (id.clone(), id)),
        Dimension::Agent => document.agent_chain.agent_id.clone().map(|id| (id.clone(), id)),
        Dimension::SubAgent => document
            .agent_chain
            .sub_agent_id
            .clone()
            .map(|id| (id.clone(), id)),
        Dimension::Company => document
            .agent_chain
            .company_id
            .clone()
            .map(|id| (id.clone(), id)),
    }
}

// =============================================================================
// Whole-Business Summary
// =============================================================================

/// The ledger the top-level P&L summary combines. Every value is a plain
/// total over the report range; assembling them from raw records is the
/// caller's (or the engine facade's) job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryInputs {
    /// Stock on hand at range start, valued at purchase price.
    pub opening_stock_purchase_value: Money,
    /// Stock on hand at range start, valued at sale price.
    pub opening_stock_sale_value: Money,
    /// Stock on hand at range end, valued at purchase price.
    pub closing_stock_purchase_value: Money,
    /// Stock on hand at range end, valued at sale price.
    pub closing_stock_sale_value: Money,

    /// Purchases net of purchase tax-and-discount handling upstream.
    pub total_purchases: Money,
    /// Sales (taxable amount plus order tax, shipping excluded).
    pub total_sales: Money,
    pub total_expenses: Money,

    pub purchase_shipping: Money,
    pub sale_shipping: Money,
    pub transfer_shipping: Money,

    pub purchase_discounts: Money,
    pub sale_discounts: Money,

    pub purchase_returns: Money,
    pub sale_returns: Money,

    pub payroll: Money,
    pub production_cost: Money,
    pub customer_rewards: Money,
}

/// The whole-business P&L summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProfitSummary {
    pub inputs: SummaryInputs,
    /// `opening stock (purchase value) + purchases − closing stock
    /// (purchase value)`.
    pub cogs: Money,
    /// `total_sales − total_purchases`.
    pub gross_profit: Money,
    /// Cost-reducing and revenue-adding adjustments:
    /// purchase discounts + purchase returns + sale shipping collected.
    pub positive_adjustments: Money,
    /// Revenue-reducing and cost-adding adjustments: expenses, payroll,
    /// production cost, rewards, sale discounts, sale returns, and
    /// purchase/transfer shipping paid.
    pub negative_adjustments: Money,
    /// `gross_profit + positive_adjustments − negative_adjustments`.
    pub net_profit: Money,
}

impl ProfitSummary {
    /// Combines the ledger. Pure integer arithmetic, no rounding.
    pub fn compute(inputs: SummaryInputs) -> Self {
        let cogs = inputs.opening_stock_purchase_value + inputs.total_purchases
            - inputs.closing_stock_purchase_value;

        let gross_profit = inputs.total_sales - inputs.total_purchases;

        let positive_adjustments =
            inputs.purchase_discounts + inputs.purchase_returns + inputs.sale_shipping;

        let negative_adjustments = inputs.total_expenses
            + inputs.payroll
            + inputs.production_cost
            + inputs.customer_rewards
            + inputs.sale_discounts
            + inputs.sale_returns
            + inputs.purchase_shipping
            + inputs.transfer_shipping;

        let net_profit = gross_profit + positive_adjustments - negative_adjustments;

        ProfitSummary {
            inputs,
            cogs,
            gross_profit,
            positive_adjustments,
            negative_adjustments,
            net_profit,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
