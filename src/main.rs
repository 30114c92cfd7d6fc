//! Stock Tracker - Product Catalog & Stock Audit Server
//!
//! Serves product CRUD, stock history, and CSV import/export over HTTP,
//! backed by a SQLite database.

use clap::Parser;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use stock_tracker::init_schema;

/// Product catalog server with a stock change audit trail
#[derive(Parser, Debug)]
#[command(name = "stock_tracker")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, default_value_t = default_db_path())]
    database: String,

    /// Port for the HTTP API
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

/// Returns the default database path: ~/.local/share/stock_tracker/products.db
fn default_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stock_tracker")
        .join("products.db")
        .to_string_lossy()
        .to_string()
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let db_path = PathBuf::from(&args.database);

    log::info!("Starting stock_tracker...");
    log::info!("Database path: {}", db_path.display());

    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::error!("Failed to create database directory: {}", e);
                std::process::exit(1);
            }
            log::info!("Created directory: {}", parent.display());
        }
    }

    // Open database connection
    let conn = match Connection::open(&db_path) {
        Ok(conn) => {
            log::info!("Opened database: {}", db_path.display());
            conn
        }
        Err(e) => {
            log::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize database schema
    if let Err(e) = init_schema(&conn) {
        log::error!("Failed to initialize database schema: {}", e);
        std::process::exit(1);
    }

    // The connection is shared with the handlers; lifecycle stays here.
    let db = Arc::new(Mutex::new(conn));

    if let Err(e) = stock_tracker::web::serve(db, args.port).await {
        log::error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
