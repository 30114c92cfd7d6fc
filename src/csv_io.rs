//! CSV import and export for the product catalog
//!
//! Import is a best-effort bulk load: each row commits on its own, a
//! malformed row is counted and skipped, and only a store failure aborts
//! the batch (surfacing the counts already committed). Imported rows do
//! not write stock audit entries; bulk loads would flood the ledger.

use crate::database::{product_from_row, PRODUCT_COLUMNS};
use crate::error::{InventoryError, Result};
use crate::models::{status_for_stock, DuplicateRow, ImportReport, ImportRow, Product};
use crate::products::{find_id_by_name, parse_stock};
use rusqlite::{params, Connection};
use std::io::{Read, Write};

/// Import products from CSV.
///
/// Expected columns: `name, unit, category, brand, stock, status, image`.
/// All are optional except `name`; a row with a blank name is skipped.
/// Rows whose name matches an existing product case-insensitively are
/// recorded in the duplicates list and skipped.
pub fn import_products<R: Read>(conn: &mut Connection, reader: R) -> Result<ImportReport> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut report = ImportReport::default();

    for result in rdr.deserialize() {
        let row: ImportRow = match result {
            Ok(row) => row,
            Err(e) => {
                log::warn!("Skipping malformed import row: {}", e);
                report.skipped += 1;
                continue;
            }
        };

        let name = row.name.trim();
        if name.is_empty() {
            report.skipped += 1;
            continue;
        }

        // Rows commit one at a time, so this also catches duplicates of
        // earlier rows in the same batch.
        match find_id_by_name(conn, name, None) {
            Ok(Some(existing_id)) => {
                report.duplicates.push(DuplicateRow {
                    name: name.to_string(),
                    existing_id,
                });
                report.skipped += 1;
                continue;
            }
            Ok(None) => {}
            Err(e) => return Err(import_failure(report, e)),
        }

        let stock = parse_stock(&row.stock).filter(|n| *n >= 0).unwrap_or(0);
        let status = if row.status.trim().is_empty() {
            status_for_stock(stock)
        } else {
            row.status.trim()
        };

        let inserted = conn.execute(
            "INSERT INTO products (name, unit, category, brand, image, stock, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                name,
                row.unit,
                row.category,
                row.brand,
                row.image,
                stock,
                status,
            ],
        );
        if let Err(e) = inserted {
            return Err(import_failure(report, e));
        }
        report.added += 1;
    }

    log::info!(
        "Import finished: {} added, {} skipped ({} duplicates)",
        report.added,
        report.skipped,
        report.duplicates.len()
    );
    Ok(report)
}

fn import_failure(report: ImportReport, source: rusqlite::Error) -> InventoryError {
    log::error!(
        "Import aborted after {} added, {} skipped: {}",
        report.added,
        report.skipped,
        source
    );
    InventoryError::Import {
        added: report.added,
        skipped: report.skipped,
        source,
    }
}

/// Column order of the exported CSV; also the header row.
const EXPORT_HEADER: [&str; 7] = ["name", "unit", "category", "brand", "stock", "status", "image"];

/// Export the whole catalog as CSV, ordered by id ascending, header first.
/// Read-only and deterministic for a given catalog state. The header row is
/// written even when the catalog is empty.
pub fn export_products<W: Write>(conn: &Connection, writer: W) -> Result<()> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id ASC"
    ))?;
    let products = stmt
        .query_map([], product_from_row)?
        .collect::<rusqlite::Result<Vec<Product>>>()?;

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPORT_HEADER)?;
    for product in &products {
        let stock = product.stock.to_string();
        wtr.write_record([
            product.name.as_str(),
            product.unit.as_str(),
            product.category.as_str(),
            product.brand.as_str(),
            stock.as_str(),
            product.status.as_str(),
            product.image.as_str(),
        ])?;
    }
    wtr.flush()?;

    log::debug!("Exported {} products", products.len());
    Ok(())
}
