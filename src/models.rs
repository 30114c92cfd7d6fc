//! Domain records for the product catalog and its stock audit trail.

use serde::{Deserialize, Serialize};

/// A catalog item. Rows are owned by the product registry and mutated only
/// through its operations; deleting a product also deletes its log entries.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub category: String,
    pub brand: String,
    pub image: String,
    pub stock: i64,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// An immutable audit record of one stock quantity transition.
///
/// Written in the same transaction as the product mutation it describes,
/// never updated afterwards, deleted only when its product is deleted.
#[derive(Debug, Clone, Serialize)]
pub struct StockLogEntry {
    pub id: i64,
    pub product_id: i64,
    pub old_stock: i64,
    pub new_stock: i64,
    pub changed_by: String,
    pub timestamp: String,
}

/// Raw caller-supplied fields for create/update.
///
/// `stock` is carried as the raw textual value so the registry can apply its
/// coercion rules itself: create defaults absent/non-numeric stock to 0,
/// update rejects anything but an explicit non-negative number.
#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    pub name: String,
    pub unit: String,
    pub category: String,
    pub brand: String,
    pub image: String,
    pub stock: Option<String>,
    pub status: Option<String>,
    pub changed_by: Option<String>,
}

/// Reconciliation report returned by a bulk CSV import.
#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub added: usize,
    pub skipped: usize,
    pub duplicates: Vec<DuplicateRow>,
}

/// One import row that matched an existing product by name.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct DuplicateRow {
    pub name: String,
    pub existing_id: i64,
}

/// Confirmation returned by delete; reports the requested id whether or not
/// a row existed (delete is idempotent).
#[derive(Debug, Serialize)]
pub struct DeletedProduct {
    pub deleted_id: i64,
}

/// One row of an inventory CSV. Every field is optional except `name`;
/// rows with a blank name are skipped, not rejected.
#[derive(Debug, Default, Deserialize)]
pub struct ImportRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub image: String,
}

/// Derive the conventional status label from a stock quantity.
pub fn status_for_stock(stock: i64) -> &'static str {
    if stock > 0 {
        "In Stock"
    } else {
        "Out of Stock"
    }
}
