//! In-memory [`RecordStore`] backing tests and embedded use.

use std::collections::HashMap;
use std::sync::RwLock;

use till_core::config::DateRange;
use till_core::types::{CommissionProfile, Document, ExpenseRecord, Product, ProductCategory};

use crate::error::StoreError;
use crate::store::{in_range, RecordStore};

#[derive(Debug, Default)]
struct Records {
    products: HashMap<String, Product>,
    categories: HashMap<String, ProductCategory>,
    profiles: Vec<CommissionProfile>,
    documents: Vec<Document>,
    expenses: Vec<ExpenseRecord>,
}

/// A [`RecordStore`] that holds everything in process memory.
///
/// Starts empty; seed it with the `insert_*` / `push_*` methods.
/// Inserting a product or category with an existing id replaces the
/// previous record.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn insert_product(&self, product: Product) {
        self.write().products.insert(product.id.clone(), product);
    }

    pub fn insert_category(&self, category: ProductCategory) {
        self.write().categories.insert(category.id.clone(), category);
    }

    pub fn push_commission_profile(&self, profile: CommissionProfile) {
        self.write().profiles.push(profile);
    }

    pub fn push_document(&self, document: Document) {
        self.write().documents.push(document);
    }

    pub fn push_expense(&self, expense: ExpenseRecord) {
        self.write().expenses.push(expense);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Records> {
        self.records.read().expect("record store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Records> {
        self.records.write().expect("record store lock poisoned")
    }
}

impl RecordStore for MemoryStore {
    fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.read().products.values().cloned().collect())
    }

    fn list_categories(&self) -> Result<Vec<ProductCategory>, StoreError> {
        Ok(self.read().categories.values().cloned().collect())
    }

    fn list_commission_profiles(&self) -> Result<Vec<CommissionProfile>, StoreError> {
        Ok(self.read().profiles.clone())
    }

    fn list_documents(&self, range: DateRange) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .read()
            .documents
            .iter()
            .filter(|document| in_range(document.dated, range))
            .cloned()
            .collect())
    }

    fn list_expenses(&self, range: DateRange) -> Result<Vec<ExpenseRecord>, StoreError> {
        Ok(self
            .read()
            .expenses
            .iter()
            .filter(|expense| in_range(expense.dated, range))
            .cloned()
            .collect())
    }
}
