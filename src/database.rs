//! Database layer for stock_tracker
//!
//! Uses parameterized queries exclusively (no SQL string concatenation).
//! Every mutation that touches both a product and its audit log runs inside
//! a single transaction.

use crate::models::Product;
use rusqlite::{Connection, Row};

/// Result type for database operations
pub type DbResult<T> = rusqlite::Result<T>;

/// Initialize the database schema
///
/// Creates tables if they don't exist:
/// - `products`: the catalog, one row per live product
/// - `inventory_logs`: append-only stock transition audit trail
pub fn init_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS products (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            unit        TEXT NOT NULL DEFAULT '',
            category    TEXT NOT NULL DEFAULT '',
            brand       TEXT NOT NULL DEFAULT '',
            image       TEXT NOT NULL DEFAULT '',
            stock       INTEGER NOT NULL DEFAULT 0,
            status      TEXT NOT NULL DEFAULT 'Out of Stock',
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Uniqueness is enforced by the registry (case-insensitive), the
        -- index here only keeps the lookup fast.
        CREATE INDEX IF NOT EXISTS idx_products_name ON products(name COLLATE NOCASE);

        CREATE TABLE IF NOT EXISTS inventory_logs (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id  INTEGER NOT NULL REFERENCES products(id),
            old_stock   INTEGER NOT NULL,
            new_stock   INTEGER NOT NULL,
            changed_by  TEXT NOT NULL DEFAULT 'admin',
            timestamp   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_inventory_logs_product ON inventory_logs(product_id);
        ",
    )?;

    log::info!("Database schema initialized");
    Ok(())
}

/// Column list matching [`product_from_row`]; keep the two in sync.
pub(crate) const PRODUCT_COLUMNS: &str =
    "id, name, unit, category, brand, image, stock, status, created_at, updated_at";

/// Map a row selected with [`PRODUCT_COLUMNS`] into a [`Product`].
pub(crate) fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        unit: row.get(2)?,
        category: row.get(3)?,
        brand: row.get(4)?,
        image: row.get(5)?,
        stock: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Get total count of products in database
pub fn get_product_count(conn: &Connection) -> DbResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))
}

/// Get total count of stock log entries
pub fn get_log_count(conn: &Connection) -> DbResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM inventory_logs", [], |row| row.get(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create an in-memory database for testing
    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn init_schema_creates_tables() {
        let conn = test_db();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='products'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='inventory_logs'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn init_schema_is_idempotent() {
        let conn = test_db();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(get_product_count(&conn).unwrap(), 0);
    }

    #[test]
    fn counts_start_at_zero() {
        let conn = test_db();
        assert_eq!(get_product_count(&conn).unwrap(), 0);
        assert_eq!(get_log_count(&conn).unwrap(), 0);
    }
}
