//! # Report Rows
//!
//! The hand-off shape for export collaborators: plain headers plus rows
//! of strings and numbers. CSV/XLSX/PDF encoding happens outside the
//! engine; this module only shapes already-computed results.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{CurrencyPrecision, Money};
use crate::profit::{Dimension, ProfitReportRow, ProfitSummary};
use crate::register::RegisterCloseSummary;

// =============================================================================
// Cells & Tables
// =============================================================================

/// One report cell. Serializes untagged, so exporters receive bare
/// `string | number` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    /// A money cell in major units at the given precision.
    pub fn money(amount: Money, precision: CurrencyPrecision) -> Self {
        Cell::Number(amount.minor() as f64 / precision.scale() as f64)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }
}

/// A fully-shaped report table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

// =============================================================================
// Shaping functions
// =============================================================================

/// Shapes dimensional profit rows for export.
pub fn profit_table(
    dimension: Dimension,
    rows: &[ProfitReportRow],
    precision: CurrencyPrecision,
) -> ReportTable {
    ReportTable {
        headers: vec![dimension.header().to_string(), "Gross Profit".to_string()],
        rows: rows
            .iter()
            .map(|row| {
                vec![
                    Cell::text(row.label.clone()),
                    Cell::money(row.gross_profit, precision),
                ]
            })
            .collect(),
    }
}

/// Shapes the whole-business P&L summary as label/value rows.
pub fn summary_table(summary: &ProfitSummary, precision: CurrencyPrecision) -> ReportTable {
    let m = |amount: Money| Cell::money(amount, precision);
    let rows = vec![
        ("Opening Stock (purchase value)", summary.inputs.opening_stock_purchase_value),
        ("Opening Stock (sale value)", summary.inputs.opening_stock_sale_value),
        ("Closing Stock (purchase value)", summary.inputs.closing_stock_purchase_value),
        ("Closing Stock (sale value)", summary.inputs.closing_stock_sale_value),
        ("Total Purchases", summary.inputs.total_purchases),
        ("Total Sales", summary.inputs.total_sales),
        ("Total Expenses", summary.inputs.total_expenses),
        ("COGS", summary.cogs),
        ("Gross Profit", summary.gross_profit),
        ("Net Profit", summary.net_profit),
    ];

    ReportTable {
        headers: vec!["Item".to_string(), "Amount".to_string()],
        rows: rows
            .into_iter()
            .map(|(label, amount)| vec![Cell::text(label), m(amount)])
            .collect(),
    }
}

/// Shapes one register close summary for the end-of-day report.
pub fn register_close_table(
    summary: &RegisterCloseSummary,
    precision: CurrencyPrecision,
) -> ReportTable {
    let m = |amount: Money| Cell::money(amount, precision);
    ReportTable {
        headers: vec!["Item".to_string(), "Amount".to_string()],
        rows: vec![
            vec![Cell::text("Opening Cash"), m(summary.opening_cash)],
            vec![Cell::text("Cash Sales"), m(summary.totals.total_cash)],
            vec![Cell::text("Card Slips"), m(summary.totals.total_card_slips)],
            vec![Cell::text("Cheques"), m(summary.totals.total_cheques)],
            vec![Cell::text("Refunds"), m(summary.totals.total_refunds)],
            vec![Cell::text("Expenses"), m(summary.totals.total_expenses)],
            vec![Cell::text("Expected Cash"), m(summary.expected_cash)],
            vec![Cell::text("Closing Cash"), m(summary.closing_cash)],
            vec![Cell::text("Variance"), m(summary.variance)],
        ],
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
