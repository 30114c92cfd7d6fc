//! Error types for stock_tracker

use std::fmt;

/// Unified error type for stock_tracker operations
#[derive(Debug)]
pub enum InventoryError {
    /// Malformed or missing required input (caller's responsibility)
    Validation(String),
    /// Product name uniqueness violation
    Conflict(String),
    /// Operation targets a nonexistent product id
    NotFound(i64),
    /// Store failure mid-import; carries the counts already committed
    Import {
        added: usize,
        skipped: usize,
        source: rusqlite::Error,
    },
    /// Database operation failed
    Database(rusqlite::Error),
    /// CSV parsing or writing failed
    Csv(csv::Error),
    /// File I/O error
    Io(std::io::Error),
}

impl fmt::Display for InventoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryError::Validation(msg) => write!(f, "Validation error: {}", msg),
            InventoryError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            InventoryError::NotFound(id) => write!(f, "Product not found: {}", id),
            InventoryError::Import {
                added,
                skipped,
                source,
            } => write!(
                f,
                "Import aborted after {} added, {} skipped: {}",
                added, skipped, source
            ),
            InventoryError::Database(e) => write!(f, "Database error: {}", e),
            InventoryError::Csv(e) => write!(f, "CSV error: {}", e),
            InventoryError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for InventoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InventoryError::Validation(_) => None,
            InventoryError::Conflict(_) => None,
            InventoryError::NotFound(_) => None,
            InventoryError::Import { source, .. } => Some(source),
            InventoryError::Database(e) => Some(e),
            InventoryError::Csv(e) => Some(e),
            InventoryError::Io(e) => Some(e),
        }
    }
}

impl From<rusqlite::Error> for InventoryError {
    fn from(err: rusqlite::Error) -> Self {
        InventoryError::Database(err)
    }
}

impl From<csv::Error> for InventoryError {
    fn from(err: csv::Error) -> Self {
        InventoryError::Csv(err)
    }
}

impl From<std::io::Error> for InventoryError {
    fn from(err: std::io::Error) -> Self {
        InventoryError::Io(err)
    }
}

/// Result alias for stock_tracker operations
pub type Result<T> = std::result::Result<T, InventoryError>;
