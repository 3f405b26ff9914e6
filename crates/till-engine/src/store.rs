//! # Record Store
//!
//! The engine's read seam. Settlement and reporting only ever need
//! listings of reference and transactional records; where they come
//! from (a database, a sync snapshot, a test fixture) is the caller's
//! concern.

use chrono::NaiveDate;

use till_core::config::DateRange;
use till_core::types::{CommissionProfile, Document, ExpenseRecord, Product, ProductCategory};

use crate::error::StoreError;

/// Read access to the records the engine computes over.
///
/// Listings that take a [`DateRange`] return only records whose
/// `dated` falls inside it (inclusive on both ends).
pub trait RecordStore: Send + Sync {
    /// Every product, keyed by callers on [`Product::id`].
    fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// The full category tree as a flat listing.
    fn list_categories(&self) -> Result<Vec<ProductCategory>, StoreError>;

    /// Commission profiles, at most one per entity in practice.
    fn list_commission_profiles(&self) -> Result<Vec<CommissionProfile>, StoreError>;

    /// Finalized documents of every kind dated within `range`.
    fn list_documents(&self, range: DateRange) -> Result<Vec<Document>, StoreError>;

    /// Operating expenses dated within `range`.
    fn list_expenses(&self, range: DateRange) -> Result<Vec<ExpenseRecord>, StoreError>;
}

/// Inclusive-bounds filter shared by store implementations.
pub(crate) fn in_range(dated: NaiveDate, range: DateRange) -> bool {
    range.contains(dated)
}
