//! # Document Totals Calculator
//!
//! The single settlement path for every document kind. Sale, draft,
//! quotation and purchase pages all feed the same input shape through
//! [`compute_totals`] instead of carrying their own copies of the math.
//!
//! ## Computation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lines                                                                  │
//! │    │  line_net = qty × unit_price − line_discount                       │
//! │    │  line_total = line_net × (1 + line_tax_rate)                       │
//! │    ▼                                                                    │
//! │  items_subtotal  =  Σ line_total          (summed at full precision)    │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  order_discount  =  fixed | subtotal × pct,  clamped to [0, subtotal]   │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  taxable = max(0, subtotal − discount)                                  │
//! │  order_tax = taxable × order_tax_rate                                   │
//! │  total_payable = taxable + order_tax + shipping                         │
//! │  payment_due = max(0, total_payable − payments_received)                │
//! │  status: due == 0 → Paid | payments == 0 → Due | else Partial           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding
//! Line nets and the subtotal accumulate in [`Exact`]; each output field
//! is rounded half-up exactly once. The payable/due identities then hold
//! on the rounded fields themselves:
//! `total_payable == taxable + order_tax + shipping` in plain integer
//! minor units, no epsilon.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{ArithmeticGuardError, CoreResult};
use crate::money::{Exact, Money, Rate};
use crate::types::{LineItem, OrderDiscount, PaymentStatus};
use crate::validation::validate_line_count;

// =============================================================================
// Totals Breakdown
// =============================================================================

/// The settled breakdown of one document. Plain data, ready to persist
/// or hand to a page; every field is already rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTotals {
    /// Sum of line totals (line discounts and line tax already applied).
    pub items_subtotal: Money,
    /// Order-level discount actually applied, after clamping.
    pub order_discount: Money,
    /// `max(0, items_subtotal − order_discount)`.
    pub taxable_amount: Money,
    /// Order tax on the taxable amount.
    pub order_tax: Money,
    /// Shipping charge, passed through unchanged.
    pub shipping_charge: Money,
    /// `taxable_amount + order_tax + shipping_charge`.
    pub total_payable: Money,
    /// Payments received, passed through unchanged.
    pub payments_received: Money,
    /// `max(0, total_payable − payments_received)`.
    pub payment_due: Money,
    /// Derived payment status.
    pub status: PaymentStatus,
}

// =============================================================================
// compute_totals
// =============================================================================

/// Computes a document's full totals breakdown.
///
/// Pure and all-or-nothing: a guard failure on any line computes no
/// totals at all, and identical inputs always produce identical output.
///
/// ## Errors
/// [`ArithmeticGuardError`] on non-positive quantity, negative price /
/// line discount / shipping / payments, or a line discount exceeding its
/// own line gross. The *order* discount is never an error: it is clamped
/// into `[0, items_subtotal]`.
///
/// ## Example
/// ```rust
/// use till_core::money::{Money, Quantity, Rate};
/// use till_core::totals::compute_totals;
/// use till_core::types::{LineItem, OrderDiscount};
///
/// let lines = vec![LineItem::simple("p1", Quantity::from_units(2), Money::from_minor(1000))];
/// let totals = compute_totals(
///     &lines,
///     Some(OrderDiscount::Percentage(Rate::from_bps(1000))), // 10%
///     Rate::from_bps(500),                                   // 5% tax
///     Money::from_minor(300),                                // shipping 3.00
///     Money::zero(),
/// )
/// .unwrap();
/// assert_eq!(totals.total_payable.minor(), 2190); // 21.90
/// ```
pub fn compute_totals(
    lines: &[LineItem],
    order_discount: Option<OrderDiscount>,
    order_tax_rate: Rate,
    shipping_charge: Money,
    payments_received: Money,
) -> CoreResult<DocumentTotals> {
    validate_line_count(lines.len())?;

    if shipping_charge.is_negative() {
        return Err(ArithmeticGuardError::NegativeShipping {
            minor: shipping_charge.minor(),
        }
        .into());
    }
    if payments_received.is_negative() {
        return Err(ArithmeticGuardError::NegativePayments {
            minor: payments_received.minor(),
        }
        .into());
    }

    // Full-precision subtotal. No rounding happens inside this loop.
    let mut subtotal = Exact::ZERO;
    for (index, line) in lines.iter().enumerate() {
        subtotal = subtotal + line_total(index, line)?;
    }

    let items_subtotal = subtotal.to_money();

    // Order discount: percentage against the exact subtotal, then clamped.
    // Clamping in Exact plus monotone rounding keeps the rounded discount
    // within [0, items_subtotal].
    let discount_exact = match order_discount {
        None => Exact::ZERO,
        Some(OrderDiscount::Fixed(amount)) => Exact::from_money(amount),
        Some(OrderDiscount::Percentage(rate)) => subtotal.apply_rate(rate),
    }
    .clamp(Exact::ZERO, subtotal.max_zero());
    let order_discount = discount_exact.to_money();

    // From here on every term is an already-rounded output field, so the
    // documented identities hold in integer minor units.
    let taxable_amount = (items_subtotal - order_discount).max_zero();
    let order_tax = Exact::from_money(taxable_amount)
        .apply_rate(order_tax_rate)
        .to_money();
    let total_payable = taxable_amount + order_tax + shipping_charge;
    let payment_due = (total_payable - payments_received).max_zero();

    let status = if payment_due.is_zero() {
        PaymentStatus::Paid
    } else if payments_received.is_zero() {
        PaymentStatus::Due
    } else {
        PaymentStatus::Partial
    };

    Ok(DocumentTotals {
        items_subtotal,
        order_discount,
        taxable_amount,
        order_tax,
        shipping_charge,
        total_payable,
        payments_received,
        payment_due,
        status,
    })
}

/// One line's contribution to the subtotal:
/// `(qty × unit_price − line_discount) × (1 + line_tax_rate)`, exact.
fn line_total(index: usize, line: &LineItem) -> CoreResult<Exact> {
    let net = line_net(index, line)?;
    Ok(net + net.apply_rate(line.line_tax_rate))
}

/// Net amount of one line before line tax: `qty × unit_price − line_discount`.
///
/// Carries all the per-line arithmetic guards. Shared with the
/// commission resolver, which pays commission on line nets, not taxed
/// totals.
pub(crate) fn line_net(index: usize, line: &LineItem) -> CoreResult<Exact> {
    if !line.quantity.is_positive() {
        return Err(ArithmeticGuardError::NonPositiveQuantity {
            line_index: index,
            milli: line.quantity.milli(),
        }
        .into());
    }
    if line.unit_price.is_negative() {
        return Err(ArithmeticGuardError::NegativeUnitPrice {
            line_index: index,
            minor: line.unit_price.minor(),
        }
        .into());
    }
    if line.line_discount.is_negative() {
        return Err(ArithmeticGuardError::NegativeLineDiscount {
            line_index: index,
            minor: line.line_discount.minor(),
        }
        .into());
    }

    let gross = Exact::price_times_quantity(line.unit_price, line.quantity);
    let discount = Exact::from_money(line.line_discount);
    if discount > gross {
        return Err(ArithmeticGuardError::LineDiscountExceedsGross {
            line_index: index,
            discount_minor: line.line_discount.minor(),
            gross_minor: gross.to_money().minor(),
        }
        .into());
    }

    Ok(gross - discount)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::money::Quantity;

    fn unit_line(qty: i64, price_minor: i64) -> LineItem {
        LineItem::simple("p", Quantity::from_units(qty), Money::from_minor(price_minor))
    }

    #[test]
    fn worked_example_from_the_sale_page() {
        // items = [{qty: 2, price: 10.00}], 10% discount, 5% tax, 3.00 shipping
        let totals = compute_totals(
            &[unit_line(2, 1000)],
            Some(OrderDiscount::Percentage(Rate::from_bps(1000))),
            Rate::from_bps(500),
            Money::from_minor(300),
            Money::zero(),
        )
        .unwrap();

        assert_eq!(totals.items_subtotal.minor(), 2000);
        assert_eq!(totals.order_discount.minor(), 200);
        assert_eq!(totals.taxable_amount.minor(), 1800);
        assert_eq!(totals.order_tax.minor(), 90);
        assert_eq!(totals.total_payable.minor(), 2190);
        assert_eq!(totals.payment_due.minor(), 2190);
        assert_eq!(totals.status, PaymentStatus::Due);
    }

    #[test]
    fn payable_identity_holds_on_rounded_fields() {
        // Fractional quantity and chained percentages: the identity must
        // hold on the output fields in plain integer arithmetic.
        let lines = vec![
            LineItem {
                product_id: "scale-1".to_string(),
                quantity: Quantity::from_milli(1_333),
                unit_price: Money::from_minor(777),
                line_discount: Money::from_minor(19),
                line_tax_rate: Rate::from_bps(825),
            },
            unit_line(3, 499),
        ];
        let totals = compute_totals(
            &lines,
            Some(OrderDiscount::Percentage(Rate::from_bps(733))),
            Rate::from_bps(1650),
            Money::from_minor(250),
            Money::from_minor(1000),
        )
        .unwrap();

        assert_eq!(
            totals.total_payable,
            (totals.items_subtotal - totals.order_discount).max_zero()
                + totals.order_tax
                + totals.shipping_charge
        );
        assert_eq!(
            totals.payment_due,
            (totals.total_payable - totals.payments_received).max_zero()
        );
    }

    #[test]
    fn fixed_discount_clamps_to_subtotal() {
        // 50.00 off a 20.00 document never inverts the subtotal.
        let totals = compute_totals(
            &[unit_line(2, 1000)],
            Some(OrderDiscount::Fixed(Money::from_minor(5000))),
            Rate::zero(),
            Money::zero(),
            Money::zero(),
        )
        .unwrap();

        assert_eq!(totals.order_discount.minor(), 2000);
        assert_eq!(totals.taxable_amount.minor(), 0);
        assert_eq!(totals.total_payable.minor(), 0);
        assert_eq!(totals.status, PaymentStatus::Paid); // nothing due
    }

    #[test]
    fn line_discount_and_line_tax_apply_before_summing() {
        // line net = 2×10.00 − 2.00 = 18.00; ×1.10 = 19.80
        let line = LineItem {
            product_id: "p".to_string(),
            quantity: Quantity::from_units(2),
            unit_price: Money::from_minor(1000),
            line_discount: Money::from_minor(200),
            line_tax_rate: Rate::from_bps(1000),
        };
        let totals =
            compute_totals(&[line], None, Rate::zero(), Money::zero(), Money::zero()).unwrap();
        assert_eq!(totals.items_subtotal.minor(), 1980);
    }

    #[test]
    fn status_derivation() {
        let lines = [unit_line(1, 1000)];

        let paid = compute_totals(&lines, None, Rate::zero(), Money::zero(), Money::from_minor(1000))
            .unwrap();
        assert_eq!(paid.status, PaymentStatus::Paid);
        assert_eq!(paid.payment_due.minor(), 0);

        let due =
            compute_totals(&lines, None, Rate::zero(), Money::zero(), Money::zero()).unwrap();
        assert_eq!(due.status, PaymentStatus::Due);

        let partial =
            compute_totals(&lines, None, Rate::zero(), Money::zero(), Money::from_minor(400))
                .unwrap();
        assert_eq!(partial.status, PaymentStatus::Partial);
        assert_eq!(partial.payment_due.minor(), 600);
    }

    #[test]
    fn overpayment_clamps_due_to_zero() {
        let totals = compute_totals(
            &[unit_line(1, 1000)],
            None,
            Rate::zero(),
            Money::zero(),
            Money::from_minor(5000),
        )
        .unwrap();
        assert_eq!(totals.payment_due.minor(), 0);
        assert_eq!(totals.status, PaymentStatus::Paid);
    }

    #[test]
    fn empty_document_settles_to_shipping_only() {
        let totals = compute_totals(&[], None, Rate::from_bps(500), Money::from_minor(300), Money::zero())
            .unwrap();
        assert_eq!(totals.items_subtotal.minor(), 0);
        assert_eq!(totals.total_payable.minor(), 300);
    }

    #[test]
    fn guards_reject_bad_lines() {
        let zero_qty = LineItem::simple("p", Quantity::from_units(0), Money::from_minor(100));
        assert!(matches!(
            compute_totals(&[zero_qty], None, Rate::zero(), Money::zero(), Money::zero()),
            Err(EngineError::Arithmetic(ArithmeticGuardError::NonPositiveQuantity { .. }))
        ));

        let negative_price = LineItem::simple("p", Quantity::from_units(1), Money::from_minor(-10));
        assert!(matches!(
            compute_totals(&[negative_price], None, Rate::zero(), Money::zero(), Money::zero()),
            Err(EngineError::Arithmetic(ArithmeticGuardError::NegativeUnitPrice { .. }))
        ));

        let inverted_line = LineItem {
            product_id: "p".to_string(),
            quantity: Quantity::from_units(1),
            unit_price: Money::from_minor(100),
            line_discount: Money::from_minor(150),
            line_tax_rate: Rate::zero(),
        };
        assert!(matches!(
            compute_totals(&[inverted_line], None, Rate::zero(), Money::zero(), Money::zero()),
            Err(EngineError::Arithmetic(ArithmeticGuardError::LineDiscountExceedsGross { .. }))
        ));

        assert!(matches!(
            compute_totals(&[], None, Rate::zero(), Money::from_minor(-1), Money::zero()),
            Err(EngineError::Arithmetic(ArithmeticGuardError::NegativeShipping { .. }))
        ));
        assert!(matches!(
            compute_totals(&[], None, Rate::zero(), Money::zero(), Money::from_minor(-1)),
            Err(EngineError::Arithmetic(ArithmeticGuardError::NegativePayments { .. }))
        ));
    }

    #[test]
    fn identical_inputs_yield_identical_output() {
        let lines = vec![unit_line(3, 1299), unit_line(1, 550)];
        let run = || {
            compute_totals(
                &lines,
                Some(OrderDiscount::Percentage(Rate::from_bps(500))),
                Rate::from_bps(825),
                Money::from_minor(100),
                Money::from_minor(2000),
            )
            .unwrap()
        };
        assert_eq!(run(), run());
    }
}
