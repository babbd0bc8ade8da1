//! # depot-db: Database Layer for the Stock Ledger
//!
//! SQLite storage for products, invoices, sales and their logs, plus the
//! [`StockLedger`] that applies a whole invoice or sale in one transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Depot Data Flow                                  │
//! │                                                                         │
//! │  axum handler (add_invoice)                                            │
//! │       │  validate_receive_request() → ReceiveInventory                  │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     depot-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  StockLedger  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (ledger.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │  BEGIN        │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  ... N lines  │    │ 001_init.sql │  │   │
//! │  │   │               │    │  COMMIT       │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           ▲                                                     │   │
//! │  │           │        Repositories (reads)                         │   │
//! │  │           └─────── products, invoices, sales, reports           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (depot.db)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Read-side repositories and row mapping
//! - [`ledger`] - Transactional receive / sell
//!
//! ## Usage
//!
//! ```rust,ignore
//! use depot_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./depot.db")).await?;
//!
//! let invoice = db.ledger().receive_invoice(&command).await?;
//! let page = db.invoices().list(PageRequest::default()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, LedgerError};
pub use ledger::StockLedger;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::invoice::InvoiceRepository;
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
