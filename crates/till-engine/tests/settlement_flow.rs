//! End-to-end flow: seed a store, settle a sale, resolve commission,
//! run a register session through its lifecycle, and report on the lot.

use std::sync::Once;

use chrono::NaiveDate;
use till_core::commission::CommissionOutcome;
use till_core::config::{DateRange, EngineConfig};
use till_core::money::{Money, Quantity, Rate};
use till_core::profit::{Dimension, SummaryInputs};
use till_core::register::SaleEventReceipt;
use till_core::types::{
    AgentChain, CommissionEntity, CommissionProfile, Customer, Document, DocumentKind,
    ExpenseRecord, LineItem, OrderDiscount, PaymentMethod, PaymentStatus, Product,
    ProductCategory,
};
use till_engine::{MemoryStore, SettlementEngine};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("till_engine=debug")),
            )
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seeded_engine() -> SettlementEngine<MemoryStore> {
    init_tracing();
    let store = MemoryStore::new();

    store.insert_category(ProductCategory {
        id: "cat-footwear".to_string(),
        name: "Footwear".to_string(),
        parent_id: None,
    });
    store.insert_category(ProductCategory {
        id: "cat-apparel".to_string(),
        name: "Apparel".to_string(),
        parent_id: None,
    });

    store.insert_product(Product {
        id: "prod-boot".to_string(),
        sku: "BOOT-01".to_string(),
        name: "Leather Boot".to_string(),
        category_id: Some("cat-footwear".to_string()),
        brand: Some("Northpeak".to_string()),
        purchase_price: Money::from_minor(6_000),
        sell_price: Money::from_minor(10_000),
    });
    store.insert_product(Product {
        id: "prod-shirt".to_string(),
        sku: "SHIRT-01".to_string(),
        name: "Linen Shirt".to_string(),
        category_id: Some("cat-apparel".to_string()),
        brand: None,
        purchase_price: Money::from_minor(1_500),
        sell_price: Money::from_minor(2_500),
    });

    store.push_commission_profile(CommissionProfile {
        id: "profile-sales".to_string(),
        entity: CommissionEntity::Salesperson,
        overall_rate: Some(Rate::from_bps(250)),
        category_rates: [("cat-footwear".to_string(), Rate::from_bps(500))]
            .into_iter()
            .collect(),
    });

    SettlementEngine::new(EngineConfig::default(), store)
}

fn sale_document() -> Document {
    Document {
        id: "doc-1001".to_string(),
        kind: DocumentKind::Sale,
        customer: Customer::Registered {
            id: "cust-7".to_string(),
            name: "R. Malik".to_string(),
        },
        dated: date(2024, 3, 12),
        location_id: "main-store".to_string(),
        staff_id: Some("staff-3".to_string()),
        agent_chain: AgentChain::default(),
        lines: vec![
            LineItem::simple("prod-boot", Quantity::from_units(2), Money::from_minor(10_000)),
            LineItem::simple("prod-shirt", Quantity::from_units(4), Money::from_minor(2_500)),
        ],
        order_discount: Some(OrderDiscount::Percentage(Rate::from_bps(1_000))),
        order_tax_rate: Rate::from_bps(500),
        shipping_charge: Money::from_minor(800),
        payments_received: Money::from_minor(20_000),
    }
}

#[test]
fn settles_commissions_and_reports_over_one_sale() {
    let engine = seeded_engine();
    let document = sale_document();
    engine.store().push_document(document.clone());

    // ----- settlement -----
    let totals = engine.settle(&document).unwrap();
    assert_eq!(totals.items_subtotal.minor(), 30_000);
    assert_eq!(totals.order_discount.minor(), 3_000);
    assert_eq!(totals.taxable_amount.minor(), 27_000);
    assert_eq!(totals.order_tax.minor(), 1_350);
    assert_eq!(totals.total_payable.minor(), 29_150);
    assert_eq!(totals.payment_due.minor(), 9_150);
    assert_eq!(totals.status, PaymentStatus::Partial);
    assert_eq!(
        totals.total_payable,
        totals.taxable_amount + totals.order_tax + totals.shipping_charge
    );

    // ----- commission -----
    let outcome: CommissionOutcome = engine
        .commission(CommissionEntity::Salesperson, &document)
        .unwrap()
        .expect("salesperson profile is seeded");
    // Boots carry the 5% footwear rate, shirts fall back to 2.5%.
    assert_eq!(outcome.amount.minor(), 20_000 * 5 / 100 + 10_000 * 25 / 1_000);
    assert!(engine
        .commission(CommissionEntity::Agent, &document)
        .unwrap()
        .is_none());

    // ----- profit by dimension -----
    let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 31));
    let rows = engine.aggregate_profit(Dimension::Product, range).unwrap();
    assert_eq!(rows.len(), 2);
    // Boots: (100.00 - 60.00) * 2 = 80.00; shirts: (25.00 - 15.00) * 4 = 40.00
    assert_eq!(rows[0].label, "Leather Boot");
    assert_eq!(rows[0].gross_profit.minor(), 8_000);
    assert_eq!(rows[1].label, "Linen Shirt");
    assert_eq!(rows[1].gross_profit.minor(), 4_000);

    let by_brand = engine.aggregate_profit(Dimension::Brand, range).unwrap();
    let unbranded = by_brand.iter().find(|r| r.key == "unbranded").unwrap();
    assert_eq!(unbranded.gross_profit.minor(), 4_000);
}

#[test]
fn register_lifecycle_with_replayed_event() {
    let engine = seeded_engine();

    let session = engine
        .open_register("main-store", Money::from_minor(50_000))
        .unwrap();

    // Two legs of the same settlement, one replayed by a retry.
    let first = engine
        .record_sale_event(&session.id, "pay-evt-1", PaymentMethod::Cash, Money::from_minor(20_000))
        .unwrap();
    assert_eq!(first, SaleEventReceipt::Recorded);
    let replay = engine
        .record_sale_event(&session.id, "pay-evt-1", PaymentMethod::Cash, Money::from_minor(20_000))
        .unwrap();
    assert_eq!(replay, SaleEventReceipt::Duplicate);
    engine
        .record_sale_event(&session.id, "pay-evt-2", PaymentMethod::Card, Money::from_minor(9_150))
        .unwrap();

    engine.record_refund(&session.id, Money::from_minor(2_500)).unwrap();
    engine.record_expense(&session.id, Money::from_minor(1_200)).unwrap();

    // expected cash = 500.00 + 200.00 - 25.00 - 12.00 = 663.00
    let open = engine.open_register_session("main-store").unwrap();
    assert_eq!(open.expected_cash().minor(), 66_300);

    let summary = engine
        .close_register(&session.id, Money::from_minor(66_000), Some("short at count".to_string()))
        .unwrap();
    assert_eq!(summary.expected_cash.minor(), 66_300);
    assert_eq!(summary.variance.minor(), -300);
    assert_eq!(summary.totals.total_card_slips.minor(), 9_150);

    assert!(engine.open_register_session("main-store").is_none());
    assert_eq!(engine.register_close_history("main-store").len(), 1);
}

#[test]
fn profit_summary_derives_store_terms_and_keeps_manual_ones() {
    let engine = seeded_engine();
    let sale = sale_document();
    engine.store().push_document(sale);

    // A supplier purchase in the same period.
    engine.store().push_document(Document {
        id: "doc-2001".to_string(),
        kind: DocumentKind::Purchase,
        customer: Customer::WalkIn,
        dated: date(2024, 3, 5),
        location_id: "main-store".to_string(),
        staff_id: None,
        agent_chain: AgentChain::default(),
        lines: vec![LineItem::simple(
            "prod-boot",
            Quantity::from_units(10),
            Money::from_minor(6_000),
        )],
        order_discount: None,
        order_tax_rate: Rate::zero(),
        shipping_charge: Money::from_minor(1_500),
        payments_received: Money::from_minor(60_000),
    });

    // A quotation that must not count anywhere.
    engine.store().push_document(Document {
        id: "doc-3001".to_string(),
        kind: DocumentKind::Quotation,
        customer: Customer::WalkIn,
        dated: date(2024, 3, 6),
        location_id: "main-store".to_string(),
        staff_id: None,
        agent_chain: AgentChain::default(),
        lines: vec![LineItem::simple(
            "prod-shirt",
            Quantity::from_units(100),
            Money::from_minor(2_500),
        )],
        order_discount: None,
        order_tax_rate: Rate::zero(),
        shipping_charge: Money::zero(),
        payments_received: Money::zero(),
    });

    engine.store().push_expense(ExpenseRecord {
        id: "exp-1".to_string(),
        dated: date(2024, 3, 20),
        location_id: "main-store".to_string(),
        amount: Money::from_minor(4_000),
    });

    let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 31));
    let manual = SummaryInputs {
        opening_stock_purchase_value: Money::from_minor(100_000),
        closing_stock_purchase_value: Money::from_minor(120_000),
        payroll: Money::from_minor(15_000),
        // These derivable fields are overwritten from the store.
        total_sales: Money::from_minor(999_999),
        total_expenses: Money::from_minor(999_999),
        ..SummaryInputs::default()
    };

    let summary = engine.profit_summary(range, manual).unwrap();
    let inputs = summary.inputs;

    assert_eq!(inputs.total_sales.minor(), 28_350); // taxable + tax, no shipping
    assert_eq!(inputs.total_purchases.minor(), 60_000);
    assert_eq!(inputs.sale_discounts.minor(), 3_000);
    assert_eq!(inputs.sale_shipping.minor(), 800);
    assert_eq!(inputs.purchase_shipping.minor(), 1_500);
    assert_eq!(inputs.total_expenses.minor(), 4_000);
    // Manual terms survive untouched.
    assert_eq!(inputs.opening_stock_purchase_value.minor(), 100_000);
    assert_eq!(inputs.payroll.minor(), 15_000);

    // COGS = 1000.00 + 600.00 - 1200.00 = 400.00
    assert_eq!(summary.cogs.minor(), 40_000);
    // gross = 283.50 - 600.00
    assert_eq!(summary.gross_profit.minor(), -31_650);
    // positive = sale shipping 8.00; negative = expenses 40.00 + payroll
    // 150.00 + sale discounts 30.00 + purchase shipping 15.00 = 235.00
    assert_eq!(summary.net_profit.minor(), -31_650 + 800 - 23_500);
}
