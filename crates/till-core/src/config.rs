//! # Engine Configuration
//!
//! The two configuration inputs the engine consumes: currency precision
//! plus rounding mode, and the date-range preset table the report pages
//! offer ("This Month", "Last Year", ...). Plain serde structs with
//! defaults; storage and settings UI live outside the engine.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{CurrencyPrecision, RoundingMode};

// =============================================================================
// Engine Config
// =============================================================================

/// Business-level numeric policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub currency_precision: CurrencyPrecision,
    pub rounding_mode: RoundingMode,
}

// =============================================================================
// Date Range
// =============================================================================

/// An inclusive calendar-day range. Documents are compared by their
/// document date, never by timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    pub from: NaiveDate,
    #[ts(as = "String")]
    pub to: NaiveDate,
}

impl DateRange {
    pub const fn new(from: NaiveDate, to: NaiveDate) -> Self {
        DateRange { from, to }
    }

    /// Inclusive at both ends.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

// =============================================================================
// Date Presets
// =============================================================================

/// Named ranges the report pages offer, resolved relative to "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DatePreset {
    Today,
    Yesterday,
    Last7Days,
    ThisMonth,
    LastMonth,
    ThisQuarter,
    ThisYear,
    LastYear,
}

impl DatePreset {
    /// Resolves the preset against an explicit "today".
    ///
    /// Taking `today` as a parameter keeps resolution pure and testable;
    /// callers pass the clock in.
    pub fn resolve(&self, today: NaiveDate) -> DateRange {
        match self {
            DatePreset::Today => DateRange::new(today, today),
            DatePreset::Yesterday => {
                let y = today.checked_sub_days(Days::new(1)).unwrap_or(today);
                DateRange::new(y, y)
            }
            DatePreset::Last7Days => DateRange::new(
                today.checked_sub_days(Days::new(6)).unwrap_or(today),
                today,
            ),
            DatePreset::ThisMonth => {
                DateRange::new(month_start(today.year(), today.month()), month_end(today.year(), today.month()))
            }
            DatePreset::LastMonth => {
                let (year, month) = if today.month() == 1 {
                    (today.year() - 1, 12)
                } else {
                    (today.year(), today.month() - 1)
                };
                DateRange::new(month_start(year, month), month_end(year, month))
            }
            DatePreset::ThisQuarter => {
                let first_month = 1 + 3 * ((today.month() - 1) / 3);
                DateRange::new(
                    month_start(today.year(), first_month),
                    month_end(today.year(), first_month + 2),
                )
            }
            DatePreset::ThisYear => DateRange::new(
                month_start(today.year(), 1),
                month_end(today.year(), 12),
            ),
            DatePreset::LastYear => DateRange::new(
                month_start(today.year() - 1, 1),
                month_end(today.year() - 1, 12),
            ),
        }
    }
}

fn month_start(year: i32, month: u32) -> NaiveDate {
    // Month is always 1..=12 here; the fallback never fires in practice.
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn month_end(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    month_start(next_year, next_month)
        .pred_opt()
        .unwrap_or(NaiveDate::MAX)
}

// =============================================================================
// Unit Tests
// =============================================================================
