//! Stock Tracker - Product Catalog & Stock Audit Trail
//!
//! Tracks a catalog of products and every change to their stock quantity.
//! Product names are unique case-insensitively, every stock transition is
//! recorded in an append-only audit log written in the same transaction as
//! the product change, and bulk CSV import reconciles duplicates without
//! aborting the batch.

pub mod csv_io;
pub mod database;
pub mod error;
pub mod models;
pub mod products;
pub mod stock_log;
pub mod web;

pub use csv_io::{export_products, import_products};
pub use database::init_schema;
pub use error::{InventoryError, Result};
pub use models::{DeletedProduct, ImportReport, Product, ProductInput, StockLogEntry};
pub use products::{
    create_product, delete_product, get_product, list_products, search_products, update_product,
};
pub use stock_log::stock_history;
