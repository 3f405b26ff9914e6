//! # Settlement Engine
//!
//! The facade callers program against:
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      SettlementEngine                        │
//! │                                                              │
//! │   EngineConfig     RecordStore (trait)    RegisterManager    │
//! │   (precision,      (products, docs,       (open sessions,    │
//! │    rounding)        profiles, expenses)    close history)    │
//! │         │                  │                     │           │
//! │         └───────── pure computations ────────────┘           │
//! │                    from till-core                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything financial is delegated to `till-core`; this layer only
//! loads records, holds register state, and translates errors.

use std::collections::HashMap;

use chrono::Utc;
use tracing::debug;

use till_core::commission::{resolve_commission, CategoryIndex, CommissionOutcome};
use till_core::config::{DatePreset, DateRange, EngineConfig};
use till_core::error::EngineError as CoreError;
use till_core::money::Money;
use till_core::profit::{aggregate_profit, Dimension, ProfitReportRow, ProfitSummary, SummaryInputs};
use till_core::register::{RegisterCloseSummary, RegisterSession, SaleEventReceipt};
use till_core::totals::{compute_totals, DocumentTotals};
use till_core::types::{CommissionEntity, Document, DocumentKind, PaymentMethod};

use crate::error::EngineResult;
use crate::manager::RegisterManager;
use crate::store::RecordStore;

/// Config + store + registers behind one API.
pub struct SettlementEngine<S: RecordStore> {
    config: EngineConfig,
    store: S,
    registers: RegisterManager,
}

impl<S: RecordStore> SettlementEngine<S> {
    pub fn new(config: EngineConfig, store: S) -> Self {
        SettlementEngine {
            config,
            store,
            registers: RegisterManager::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ===== Settlement =====

    /// Computes the authoritative totals block for a document.
    pub fn settle(&self, document: &Document) -> EngineResult<DocumentTotals> {
        let totals = compute_totals(
            &document.lines,
            document.order_discount,
            document.order_tax_rate,
            document.shipping_charge,
            document.payments_received,
        )?;
        debug!(
            document_id = %document.id,
            total_payable = %totals.total_payable,
            status = ?totals.status,
            "document settled"
        );
        Ok(totals)
    }

    // ===== Commission =====

    /// Commission owed to `entity` for a document, or `None` when no
    /// profile is configured for that entity.
    pub fn commission(
        &self,
        entity: CommissionEntity,
        document: &Document,
    ) -> EngineResult<Option<CommissionOutcome>> {
        let profiles = self.store.list_commission_profiles()?;
        let Some(profile) = profiles.iter().find(|p| p.entity == entity) else {
            debug!(entity = entity.label(), "no commission profile configured");
            return Ok(None);
        };

        let products = self.store.list_products()?;
        let categories =
            CategoryIndex::build(self.store.list_categories()?).map_err(CoreError::from)?;
        let outcome = resolve_commission(profile, &document.lines, &products, &categories)?;
        Ok(Some(outcome))
    }

    // ===== Register =====

    pub fn open_register(&self, location: &str, opening_cash: Money) -> EngineResult<RegisterSession> {
        Ok(self.registers.open(location, opening_cash)?)
    }

    pub fn record_sale_event(
        &self,
        session_id: &str,
        payment_event_id: &str,
        method: PaymentMethod,
        amount: Money,
    ) -> EngineResult<SaleEventReceipt> {
        Ok(self
            .registers
            .record_sale_event(session_id, payment_event_id, method, amount)?)
    }

    pub fn record_refund(&self, session_id: &str, amount: Money) -> EngineResult<()> {
        Ok(self.registers.record_refund(session_id, amount)?)
    }

    pub fn record_expense(&self, session_id: &str, amount: Money) -> EngineResult<()> {
        Ok(self.registers.record_expense(session_id, amount)?)
    }

    pub fn close_register(
        &self,
        session_id: &str,
        closing_cash: Money,
        closing_note: Option<String>,
    ) -> EngineResult<RegisterCloseSummary> {
        Ok(self.registers.close(session_id, closing_cash, closing_note)?)
    }

    pub fn open_register_session(&self, location: &str) -> Option<RegisterSession> {
        self.registers.open_session(location)
    }

    pub fn register_close_history(&self, location: &str) -> Vec<RegisterCloseSummary> {
        self.registers.close_history(location)
    }

    // ===== Reporting =====

    /// Gross-profit rows grouped by `dimension` over `range`.
    pub fn aggregate_profit(
        &self,
        dimension: Dimension,
        range: DateRange,
    ) -> EngineResult<Vec<ProfitReportRow>> {
        let documents = self.store.list_documents(range)?;
        let products = self.store.list_products()?;
        let categories =
            CategoryIndex::build(self.store.list_categories()?).map_err(CoreError::from)?;
        Ok(aggregate_profit(
            dimension,
            range,
            &documents,
            &products,
            &categories,
        ))
    }

    /// Preset variant of [`Self::aggregate_profit`], resolved against
    /// today's calendar date.
    pub fn aggregate_profit_preset(
        &self,
        dimension: Dimension,
        preset: DatePreset,
    ) -> EngineResult<Vec<ProfitReportRow>> {
        self.aggregate_profit(dimension, preset.resolve(Utc::now().date_naive()))
    }

    /// Whole-business P&L over `range`.
    ///
    /// Sales, purchases, their discounts and shipping, and operating
    /// expenses are derived from stored records; the remaining terms
    /// (stock valuations, payroll, production cost, rewards) come from
    /// `manual`, whose derivable fields are overwritten here.
    pub fn profit_summary(
        &self,
        range: DateRange,
        manual: SummaryInputs,
    ) -> EngineResult<ProfitSummary> {
        let documents = self.store.list_documents(range)?;

        let mut inputs = manual;
        inputs.total_sales = Money::zero();
        inputs.total_purchases = Money::zero();
        inputs.sale_discounts = Money::zero();
        inputs.purchase_discounts = Money::zero();
        inputs.sale_shipping = Money::zero();
        inputs.purchase_shipping = Money::zero();

        for document in &documents {
            if !matches!(document.kind, DocumentKind::Sale | DocumentKind::Purchase) {
                continue;
            }
            let totals = self.settle(document)?;
            // Shipping stays out of the sales/purchases terms; the
            // summary ledger carries it on its own lines.
            let amount = totals.taxable_amount + totals.order_tax;
            match document.kind {
                DocumentKind::Sale => {
                    inputs.total_sales += amount;
                    inputs.sale_discounts += totals.order_discount;
                    inputs.sale_shipping += totals.shipping_charge;
                }
                DocumentKind::Purchase => {
                    inputs.total_purchases += amount;
                    inputs.purchase_discounts += totals.order_discount;
                    inputs.purchase_shipping += totals.shipping_charge;
                }
                DocumentKind::Draft | DocumentKind::Quotation => unreachable!(),
            }
        }

        inputs.total_expenses = self
            .store
            .list_expenses(range)?
            .iter()
            .map(|expense| expense.amount)
            .sum();

        Ok(ProfitSummary::compute(inputs))
    }

    /// Preset variant of [`Self::profit_summary`].
    pub fn profit_summary_preset(
        &self,
        preset: DatePreset,
        manual: SummaryInputs,
    ) -> EngineResult<ProfitSummary> {
        self.profit_summary(preset.resolve(Utc::now().date_naive()), manual)
    }

    /// Totals for many documents keyed by document id, for listing
    /// screens that show a page of documents at once.
    pub fn settle_batch(&self, documents: &[Document]) -> EngineResult<HashMap<String, DocumentTotals>> {
        let mut settled = HashMap::with_capacity(documents.len());
        for document in documents {
            settled.insert(document.id.clone(), self.settle(document)?);
        }
        Ok(settled)
    }
}
