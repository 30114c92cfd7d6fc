//! Web server exposing the product catalog operations
//!
//! REST endpoints for product CRUD, stock history, and CSV import/export.
//! The engine itself lives in `products`, `stock_log`, and `csv_io`; this
//! layer only maps payloads in and error kinds out to status codes.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use crate::csv_io::{export_products, import_products};
use crate::error::InventoryError;
use crate::models::{DeletedProduct, ImportReport, Product, ProductInput, StockLogEntry};
use crate::products::{create_product, delete_product, list_products, search_products, update_product};
use crate::stock_log::stock_history;

/// Shared application state (thread-safe database connection)
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
}

/// Search query parameters
#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

/// API response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// JSON payload for create/update.
///
/// `stock` accepts either a JSON number or a string; both are handed to the
/// registry as raw text so its coercion rules apply uniformly.
#[derive(Deserialize)]
struct ProductPayload {
    #[serde(default)]
    name: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    stock: Option<Value>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    changed_by: Option<String>,
}

impl ProductPayload {
    fn into_input(self) -> ProductInput {
        ProductInput {
            name: self.name,
            unit: self.unit,
            category: self.category,
            brand: self.brand,
            image: self.image,
            stock: raw_stock(self.stock),
            status: self.status,
            changed_by: self.changed_by,
        }
    }
}

/// Flatten a JSON stock value into the raw text form the registry parses.
fn raw_stock(value: Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    }
}

/// Map an engine error to the HTTP status the transport reports it as.
fn error_status(err: &InventoryError) -> StatusCode {
    match err {
        InventoryError::Validation(_) => StatusCode::BAD_REQUEST,
        InventoryError::Conflict(_) => StatusCode::CONFLICT,
        InventoryError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn engine_error<T>(err: InventoryError) -> (StatusCode, Json<ApiResponse<T>>) {
    let status = error_status(&err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        log::error!("{}", err);
    }
    (status, Json(ApiResponse::err(err.to_string())))
}

fn db_error<T>(err: rusqlite::Error) -> (StatusCode, Json<ApiResponse<T>>) {
    engine_error(InventoryError::Database(err))
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<T>>)>;

/// GET /api/products
async fn list_handler(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let conn = state.db.lock().unwrap();
    list_products(&conn)
        .map(|products| Json(ApiResponse::ok(products)))
        .map_err(db_error)
}

/// GET /api/products/search?q={query}
async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<Product>> {
    let conn = state.db.lock().unwrap();
    search_products(&conn, &params.q)
        .map(|products| Json(ApiResponse::ok(products)))
        .map_err(db_error)
}

/// GET /api/products/{id}/history
async fn history_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<StockLogEntry>> {
    let conn = state.db.lock().unwrap();
    stock_history(&conn, id)
        .map(|entries| Json(ApiResponse::ok(entries)))
        .map_err(db_error)
}

/// POST /api/products
async fn create_handler(
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> ApiResult<Product> {
    let mut conn = state.db.lock().unwrap();
    create_product(&mut conn, &payload.into_input())
        .map(|product| Json(ApiResponse::ok(product)))
        .map_err(engine_error)
}

/// PUT /api/products/{id}
async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductPayload>,
) -> ApiResult<Product> {
    let mut conn = state.db.lock().unwrap();
    update_product(&mut conn, id, &payload.into_input())
        .map(|product| Json(ApiResponse::ok(product)))
        .map_err(engine_error)
}

/// DELETE /api/products/{id}
async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<DeletedProduct> {
    let mut conn = state.db.lock().unwrap();
    delete_product(&mut conn, id)
        .map(|confirmation| Json(ApiResponse::ok(confirmation)))
        .map_err(engine_error)
}

/// POST /api/products/import (request body = CSV text)
async fn import_handler(State(state): State<AppState>, body: String) -> ApiResult<ImportReport> {
    let mut conn = state.db.lock().unwrap();
    import_products(&mut conn, body.as_bytes())
        .map(|report| Json(ApiResponse::ok(report)))
        .map_err(engine_error)
}

/// GET /api/products/export (response body = CSV text)
async fn export_handler(State(state): State<AppState>) -> Response {
    let conn = state.db.lock().unwrap();
    let mut out = Vec::new();
    match export_products(&conn, &mut out) {
        Ok(()) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
            .header(
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"products.csv\"",
            )
            .body(Body::from(out))
            .unwrap(),
        Err(e) => {
            log::error!("Export failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Build the web server router
pub fn create_router(db: Arc<Mutex<Connection>>) -> Router {
    let state = AppState { db };

    Router::new()
        .route("/api/products", get(list_handler).post(create_handler))
        .route("/api/products/search", get(search_handler))
        .route("/api/products/export", get(export_handler))
        .route("/api/products/import", post(import_handler))
        .route(
            "/api/products/{id}",
            axum::routing::put(update_handler).delete(delete_handler),
        )
        .route("/api/products/{id}/history", get(history_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the web server (async)
///
/// Binds to 0.0.0.0 (all interfaces) to work with Docker port mapping.
/// When running locally, use firewall rules to restrict access.
pub async fn serve(
    db: Arc<Mutex<Connection>>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(db);
    let addr = format!("0.0.0.0:{}", port);

    log::info!("API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
