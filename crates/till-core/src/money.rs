//! # Money Module
//!
//! Monetary primitives shared by every other component: `Money` (integer
//! minor units), `Rate` (basis points), `Quantity` (milli-units for
//! weighable products) and `Exact` (full-precision intermediate sums).
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units at the configured precision          │
//! │    2 decimals: 1099  = 10.99                                            │
//! │    3 decimals: 10990 = 10.990                                           │
//! │                                                                         │
//! │  Intermediate sums stay in `Exact` (i128, nano-minor scale) and are     │
//! │  rounded half-up to `Money` exactly ONCE per output field. Rounding     │
//! │  never compounds across the 10+ fields of a totals breakdown.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::money::{Money, Rate, Exact};
//!
//! let price = Money::from_minor(1099); // 10.99 at 2-decimal precision
//! let doubled = price * 2;             // 21.98
//!
//! // Percentage application goes through Exact, never through floats
//! let tax = Exact::from_money(price).apply_rate(Rate::from_bps(500)).to_money();
//! assert_eq!(tax.minor(), 55); // 0.5495 → 0.55, half-up
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Currency Precision & Rounding Mode
// =============================================================================

/// Number of decimal places a currency carries (a business-level setting).
///
/// The engine never hardcodes 2 decimals: minor units are interpreted at
/// whatever precision the deployment configures (2, 3 or 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CurrencyPrecision {
    /// 2 decimal places (most currencies).
    Two,
    /// 3 decimal places (e.g. KWD, BHD).
    Three,
    /// 4 decimal places (high-precision deployments).
    Four,
}

impl CurrencyPrecision {
    /// Minor units per major unit (100, 1_000 or 10_000).
    #[inline]
    pub const fn scale(&self) -> i64 {
        match self {
            CurrencyPrecision::Two => 100,
            CurrencyPrecision::Three => 1_000,
            CurrencyPrecision::Four => 10_000,
        }
    }

    /// Number of decimal places.
    #[inline]
    pub const fn decimals(&self) -> u32 {
        match self {
            CurrencyPrecision::Two => 2,
            CurrencyPrecision::Three => 3,
            CurrencyPrecision::Four => 4,
        }
    }
}

impl Default for CurrencyPrecision {
    fn default() -> Self {
        CurrencyPrecision::Two
    }
}

/// Rounding applied when an `Exact` value becomes a `Money` output.
///
/// The business setting enumerates exactly one mode; modeling it as a
/// closed enum keeps the configuration surface honest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingMode {
    /// Round half away from zero (ties on .5 round up in magnitude).
    HalfUp,
}

impl Default for RoundingMode {
    fn default() -> Self {
        RoundingMode::HalfUp
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in minor units at the configured currency precision.
///
/// ## Design Decisions
/// - **i64 (signed)**: negative values are legal for variance and refunds
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Precision lives in configuration**, not in the value: all values in
///   one deployment share one precision, so carrying it per-value would
///   only invite mixed-precision bugs
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, Default,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let price = Money::from_minor(1099); // 10.99 at 2 decimals
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole major units at the given precision.
    ///
    /// ```rust
    /// use till_core::money::{CurrencyPrecision, Money};
    ///
    /// let ten = Money::from_major(10, CurrencyPrecision::Three);
    /// assert_eq!(ten.minor(), 10_000);
    /// ```
    #[inline]
    pub const fn from_major(major: i64, precision: CurrencyPrecision) -> Self {
        Money(major * precision.scale())
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Clamps to zero when negative. Used for `max(0, …)` steps of the
    /// totals contract (taxable amount, payment due).
    #[inline]
    pub const fn max_zero(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Formats with an explicit precision, e.g. `10.990` at three decimals.
    ///
    /// Debug/log helper only. Localized currency display is a presentation
    /// concern and happens outside this engine.
    pub fn format(&self, precision: CurrencyPrecision) -> String {
        let scale = precision.scale();
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}.{:0width$}",
            sign,
            (self.0 / scale).abs(),
            (self.0 % scale).abs(),
            width = precision.decimals() as usize
        )
    }
}

/// Display assumes 2-decimal precision; use [`Money::format`] otherwise.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(CurrencyPrecision::Two))
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by integer (whole-unit quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Rate (basis points)
// =============================================================================

/// A percentage in basis points: 1 bps = 0.01%, so 825 = 8.25%.
///
/// Used uniformly for tax rates, percentage discounts and commission
/// rates. Valid business range is 0..=10_000 (0%..100%); construction is
/// unchecked, range enforcement lives in [`crate::validation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage, `8.25` → 825 bps.
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Quantity (milli-units)
// =============================================================================

/// A line-item quantity in milli-units.
///
/// Countable products use whole units (`3` → 3_000 milli); weighable
/// products carry fractional quantities (`1.250 kg` → 1_250 milli).
/// Integer milli-units keep quantity math exact, same reasoning as
/// integer money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS, Default)]
#[ts(export)]
pub struct Quantity(i64);

/// Milli-units per whole unit.
pub const QUANTITY_SCALE: i64 = 1_000;

impl Quantity {
    /// Creates a quantity from whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * QUANTITY_SCALE)
    }

    /// Creates a quantity from milli-units (weighable products).
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    /// Returns the quantity in milli-units.
    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

// =============================================================================
// Exact (full-precision intermediate)
// =============================================================================

/// Nano-minor units per minor unit: the `Exact` working scale.
const NANO: i128 = 1_000_000_000;

/// A full-precision monetary intermediate.
///
/// ## Contract
/// All intermediate sums inside a computation (line nets, subtotals,
/// percentage applications) accumulate in `Exact`; each monetary output
/// field calls [`Exact::to_money`] exactly once. One rounding step per
/// output, never per intermediate.
///
/// ## Scale
/// i128 at 10^9 nano-minor units per minor unit. A chained percentage
/// (discount% then tax%) resolves to 10^-8 minor units, comfortably
/// inside the nano grid; i128 headroom covers any realistic document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Exact(i128);

impl Exact {
    /// Zero.
    pub const ZERO: Exact = Exact(0);

    /// Lifts a `Money` value to full precision.
    #[inline]
    pub const fn from_money(m: Money) -> Self {
        Exact(m.minor() as i128 * NANO)
    }

    /// Exact line base: `unit_price × quantity`.
    ///
    /// `minor × milli × 10^6` lands exactly on the nano grid, so fractional
    /// quantities introduce no error at all.
    #[inline]
    pub const fn price_times_quantity(unit_price: Money, qty: Quantity) -> Self {
        Exact(unit_price.minor() as i128 * qty.milli() as i128 * (NANO / QUANTITY_SCALE as i128))
    }

    /// Applies a percentage: `self × rate`.
    ///
    /// Ties at the nano grid round half away from zero; the residual is
    /// below 10^-9 minor units and vanishes at the single final rounding.
    #[inline]
    pub fn apply_rate(self, rate: Rate) -> Self {
        Exact(div_half_up(self.0 * rate.bps() as i128, 10_000))
    }

    /// Clamps to zero when negative.
    #[inline]
    pub const fn max_zero(self) -> Self {
        if self.0 < 0 {
            Exact(0)
        } else {
            self
        }
    }

    /// Clamps into `[lo, hi]`.
    #[inline]
    pub fn clamp(self, lo: Exact, hi: Exact) -> Self {
        if self < lo {
            lo
        } else if self > hi {
            hi
        } else {
            self
        }
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// The single final rounding step: half-up to minor units.
    #[inline]
    pub fn to_money(self) -> Money {
        Money::from_minor(div_half_up(self.0, NANO) as i64)
    }
}

impl Add for Exact {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Exact(self.0 + other.0)
    }
}

impl Sub for Exact {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Exact(self.0 - other.0)
    }
}

impl Sum for Exact {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Exact::ZERO, |acc, e| acc + e)
    }
}

/// Integer division rounding half away from zero. `denom` must be positive.
#[inline]
fn div_half_up(numer: i128, denom: i128) -> i128 {
    debug_assert!(denom > 0);
    if numer >= 0 {
        (numer + denom / 2) / denom
    } else {
        -((-numer + denom / 2) / denom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
