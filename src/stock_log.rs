//! Stock audit trail
//!
//! `inventory_logs` is append-only: entries are written exclusively from
//! product registry mutations, inside the same transaction as the product
//! row change, and are never updated afterwards. The only delete path is
//! the cascade when a product itself is deleted.

use crate::database::DbResult;
use crate::models::StockLogEntry;
use rusqlite::{params, Connection, Transaction};

/// All stock transitions for a product, newest first.
///
/// No existence check is made on `product_id`; an unknown id simply yields
/// an empty history. Callers wanting a not-found error should look the
/// product up first.
pub fn stock_history(conn: &Connection, product_id: i64) -> DbResult<Vec<StockLogEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, product_id, old_stock, new_stock, changed_by, timestamp
         FROM inventory_logs
         WHERE product_id = ?1
         ORDER BY timestamp DESC, id DESC",
    )?;
    let entries = stmt
        .query_map(params![product_id], |row| {
            Ok(StockLogEntry {
                id: row.get(0)?,
                product_id: row.get(1)?,
                old_stock: row.get(2)?,
                new_stock: row.get(3)?,
                changed_by: row.get(4)?,
                timestamp: row.get(5)?,
            })
        })?
        .collect::<DbResult<Vec<_>>>()?;
    Ok(entries)
}

/// Append one stock transition record.
///
/// Takes the live transaction of the product mutation that caused the
/// change, so a log entry can never be committed without its product write
/// (or vice versa).
pub(crate) fn append_stock_log(
    tx: &Transaction<'_>,
    product_id: i64,
    old_stock: i64,
    new_stock: i64,
    changed_by: &str,
) -> DbResult<()> {
    tx.execute(
        "INSERT INTO inventory_logs (product_id, old_stock, new_stock, changed_by)
         VALUES (?1, ?2, ?3, ?4)",
        params![product_id, old_stock, new_stock, changed_by],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::init_schema;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn history_of_unknown_product_is_empty() {
        let conn = test_db();
        assert!(stock_history(&conn, 12345).unwrap().is_empty());
    }

    #[test]
    fn append_records_transition_with_attribution() {
        let mut conn = test_db();
        let tx = conn.transaction().unwrap();
        append_stock_log(&tx, 1, 0, 5, "admin").unwrap();
        tx.commit().unwrap();

        let history = stock_history(&conn, 1).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].product_id, 1);
        assert_eq!(history[0].old_stock, 0);
        assert_eq!(history[0].new_stock, 5);
        assert_eq!(history[0].changed_by, "admin");
        assert!(!history[0].timestamp.is_empty());
    }

    #[test]
    fn history_returns_newest_entry_first() {
        let mut conn = test_db();
        let tx = conn.transaction().unwrap();
        append_stock_log(&tx, 7, 0, 3, "admin").unwrap();
        append_stock_log(&tx, 7, 3, 9, "admin").unwrap();
        append_stock_log(&tx, 8, 0, 1, "admin").unwrap();
        tx.commit().unwrap();

        let history = stock_history(&conn, 7).unwrap();
        assert_eq!(history.len(), 2);
        // Same-second timestamps fall back to id ordering
        assert_eq!(history[0].old_stock, 3);
        assert_eq!(history[0].new_stock, 9);
        assert_eq!(history[1].old_stock, 0);
    }

    #[test]
    fn rolled_back_append_leaves_no_entry() {
        let mut conn = test_db();
        let tx = conn.transaction().unwrap();
        append_stock_log(&tx, 1, 0, 5, "admin").unwrap();
        drop(tx); // rollback

        assert!(stock_history(&conn, 1).unwrap().is_empty());
    }
}
