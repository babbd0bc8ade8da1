//! # Repository Module
//!
//! Read-side database access for the stock ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  axum handler                                                           │
//! │       │                                                                 │
//! │       │  db.invoices().list(page)                                       │
//! │       ▼                                                                 │
//! │  InvoiceRepository                                                      │
//! │  ├── list(&self, page)          → Page<Invoice>                         │
//! │  ├── get_by_id(&self, id)       → Option<Invoice>                       │
//! │  └── list_stock_logs(&self, p)  → Page<StockLogEntry>                   │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Writes that touch stock live in `ledger`, never here.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog lookup and inserts
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - Invoice history, stock logs
//! - [`SaleRepository`](sale::SaleRepository) - Sale history, sale logs
//! - [`ReportRepository`](report::ReportRepository) - Remainders

pub mod invoice;
pub mod product;
pub mod report;
pub mod sale;
