//! HTTP routes.
//!
//! ```text
//! POST /api/stock/add-invoice     receive an invoice batch      (auth)
//! POST /api/stock/add-sale        record a sale batch           (auth)
//! GET  /api/stock/history         invoices, newest first
//! GET  /api/stock/history-items   stock logs, newest first
//! GET  /api/stock/sales           sales, newest first
//! GET  /api/stock/sales-items     sale logs, newest first
//! GET  /api/stock/remainders      on-hand quantity and value
//! GET  /api/stock/invoices/{id}   one invoice with lines
//! GET  /api/stock/sales/{id}       one sale with lines
//! GET  /health                    liveness and database status
//! ```

pub mod health;
pub mod stock;

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

/// Builds the route table. Middleware is layered on in [`crate::create_router`].
pub fn routes() -> Router<AppState> {
    let stock = Router::new()
        .route("/add-invoice", post(stock::add_invoice))
        .route("/add-sale", post(stock::add_sale))
        .route("/history", get(stock::history))
        .route("/history-items", get(stock::history_items))
        .route("/sales", get(stock::sales))
        .route("/sales-items", get(stock::sales_items))
        .route("/remainders", get(stock::remainders))
        .route("/invoices/{id}", get(stock::get_invoice))
        .route("/sales/{id}", get(stock::get_sale));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/stock", stock)
}
