//! Product registry operations
//!
//! Owns the `products` table: every create/update/delete goes through here.
//! Enforces case-insensitive name uniqueness and pairs each stock change
//! with an audit log entry in the same transaction.

use crate::database::{product_from_row, DbResult, PRODUCT_COLUMNS};
use crate::error::{InventoryError, Result};
use crate::models::{status_for_stock, DeletedProduct, Product, ProductInput};
use crate::stock_log::append_stock_log;
use rusqlite::{params, Connection, OptionalExtension, Transaction};

/// Attribution used when a stock change does not name its author.
pub const DEFAULT_CHANGED_BY: &str = "admin";

/// List all products, newest first.
pub fn list_products(conn: &Connection) -> DbResult<Vec<Product>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id DESC"
    ))?;
    let products = stmt
        .query_map([], product_from_row)?
        .collect::<DbResult<Vec<_>>>()?;
    Ok(products)
}

/// Search products by name (case-insensitive substring match), newest first.
/// An empty query matches everything.
pub fn search_products(conn: &Connection, query: &str) -> DbResult<Vec<Product>> {
    let pattern = format!("%{}%", query);
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products
         WHERE name LIKE ?1 COLLATE NOCASE
         ORDER BY id DESC"
    ))?;
    let products = stmt
        .query_map(params![pattern], product_from_row)?
        .collect::<DbResult<Vec<_>>>()?;
    Ok(products)
}

/// Get a product by id.
pub fn get_product(conn: &Connection, id: i64) -> DbResult<Option<Product>> {
    conn.query_row(
        &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
        params![id],
        product_from_row,
    )
    .optional()
}

/// Find the id of a live product whose name equals `name` case-insensitively,
/// optionally excluding one id (used by update to skip the record itself).
pub(crate) fn find_id_by_name(
    conn: &Connection,
    name: &str,
    exclude_id: Option<i64>,
) -> DbResult<Option<i64>> {
    match exclude_id {
        Some(id) => conn
            .query_row(
                "SELECT id FROM products WHERE name = ?1 COLLATE NOCASE AND id != ?2",
                params![name, id],
                |row| row.get(0),
            )
            .optional(),
        None => conn
            .query_row(
                "SELECT id FROM products WHERE name = ?1 COLLATE NOCASE",
                params![name],
                |row| row.get(0),
            )
            .optional(),
    }
}

/// Parse a raw stock value with standard decimal parsing.
///
/// Returns `None` for non-numeric input. Fractional values truncate toward
/// zero; negative values are returned as-is so callers can reject them.
pub(crate) fn parse_stock(raw: &str) -> Option<i64> {
    let n: f64 = raw.trim().parse().ok()?;
    if n.is_nan() {
        return None;
    }
    Some(n as i64)
}

/// Validate and trim a product name.
fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(InventoryError::Validation(
            "Product name is required".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Resolve the stock value for a create: absent, blank, or non-numeric input
/// defaults to 0, but an explicitly negative number is rejected.
fn resolve_create_stock(raw: Option<&str>) -> Result<i64> {
    let raw = match raw {
        Some(r) if !r.trim().is_empty() => r,
        _ => return Ok(0),
    };
    match parse_stock(raw) {
        Some(n) if n < 0 => Err(InventoryError::Validation(
            "Stock cannot be negative".to_string(),
        )),
        Some(n) => Ok(n),
        None => Ok(0),
    }
}

/// Resolve the stock value for an update: an explicit valid non-negative
/// number is required, there is no default path.
fn resolve_update_stock(raw: Option<&str>) -> Result<i64> {
    match raw.and_then(parse_stock) {
        Some(n) if n >= 0 => Ok(n),
        Some(_) => Err(InventoryError::Validation(
            "Stock cannot be negative".to_string(),
        )),
        None => Err(InventoryError::Validation(
            "Stock must be a valid non-negative number".to_string(),
        )),
    }
}

/// Re-read a product inside the transaction that just wrote it, so the
/// returned record carries the store-assigned timestamps.
fn read_back(tx: &Transaction<'_>, id: i64) -> DbResult<Product> {
    tx.query_row(
        &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
        params![id],
        product_from_row,
    )
}

/// Create a new product.
///
/// Validates the name, coerces stock (defaulting to 0 when absent or
/// non-numeric), checks name uniqueness, and inserts. If the initial stock
/// is positive, an audit log entry `(0 -> stock)` is written in the same
/// transaction.
pub fn create_product(conn: &mut Connection, input: &ProductInput) -> Result<Product> {
    let name = validate_name(&input.name)?;
    let stock = resolve_create_stock(input.stock.as_deref())?;

    if find_id_by_name(conn, &name, None)?.is_some() {
        return Err(InventoryError::Conflict(
            "Product name already exists".to_string(),
        ));
    }

    let status = match &input.status {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => status_for_stock(stock).to_string(),
    };

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO products (name, unit, category, brand, image, stock, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            name,
            input.unit,
            input.category,
            input.brand,
            input.image,
            stock,
            status,
        ],
    )?;
    let id = tx.last_insert_rowid();

    if stock > 0 {
        let changed_by = input.changed_by.as_deref().unwrap_or(DEFAULT_CHANGED_BY);
        append_stock_log(&tx, id, 0, stock, changed_by)?;
    }

    let product = read_back(&tx, id)?;
    tx.commit()?;

    log::info!("Created product {} ({}, stock {})", id, product.name, stock);
    Ok(product)
}

/// Update an existing product.
///
/// Unlike create, stock must be supplied as an explicit valid non-negative
/// number. When the new stock differs from the stored one, an audit log
/// entry `(old -> new)` is written in the same transaction as the update.
pub fn update_product(conn: &mut Connection, id: i64, input: &ProductInput) -> Result<Product> {
    let name = validate_name(&input.name)?;
    let stock = resolve_update_stock(input.stock.as_deref())?;

    let existing = get_product(conn, id)?.ok_or(InventoryError::NotFound(id))?;

    if find_id_by_name(conn, &name, Some(id))?.is_some() {
        return Err(InventoryError::Conflict(
            "Product name already exists".to_string(),
        ));
    }

    let status = match &input.status {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => status_for_stock(stock).to_string(),
    };

    let tx = conn.transaction()?;
    tx.execute(
        "UPDATE products
         SET name = ?1, unit = ?2, category = ?3, brand = ?4, image = ?5,
             stock = ?6, status = ?7, updated_at = datetime('now')
         WHERE id = ?8",
        params![
            name,
            input.unit,
            input.category,
            input.brand,
            input.image,
            stock,
            status,
            id,
        ],
    )?;

    if stock != existing.stock {
        let changed_by = input.changed_by.as_deref().unwrap_or(DEFAULT_CHANGED_BY);
        append_stock_log(&tx, id, existing.stock, stock, changed_by)?;
    }

    let product = read_back(&tx, id)?;
    tx.commit()?;

    log::info!(
        "Updated product {} (stock {} -> {})",
        id,
        existing.stock,
        stock
    );
    Ok(product)
}

/// Delete a product and all of its stock log entries.
///
/// Idempotent: deleting an id with no live row is not an error, the
/// confirmation reports the requested id either way.
pub fn delete_product(conn: &mut Connection, id: i64) -> Result<DeletedProduct> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM inventory_logs WHERE product_id = ?1", params![id])?;
    let removed = tx.execute("DELETE FROM products WHERE id = ?1", params![id])?;
    tx.commit()?;

    if removed > 0 {
        log::info!("Deleted product {} and its stock history", id);
    } else {
        log::debug!("Delete requested for missing product {}", id);
    }
    Ok(DeletedProduct { deleted_id: id })
}
