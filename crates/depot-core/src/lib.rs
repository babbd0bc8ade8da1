//! # depot-core: Pure Business Logic for the Stock Ledger
//!
//! This crate holds every rule of the stock ledger that can be expressed
//! without touching a database: money arithmetic, request validation,
//! pagination and the remainder projection.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Depot Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Admin / Storefront Frontend                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP (JSON)                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum routes)                       │   │
//! │  │    add-invoice, add-sale, history, remainders                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ depot-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ pagination│  │ validation│  │   │
//! │  │   │  Invoice  │  │   Money   │  │   Page    │  │  batches  │  │   │
//! │  │   │   Sale    │  │  parsing  │  │ PageReq   │  │  prices   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  depot-db (StockLedger, SQLite)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Invoice, StockLog, Sale, SaleLog)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Batch validation for receiving and selling
//! - [`request`] - Wire payloads and the validated commands they become
//! - [`pagination`] - Page requests and paged results
//! - [`report`] - Remainder (on-hand valuation) projection
//!
//! ## Example Usage
//!
//! ```rust
//! use depot_core::money::Money;
//!
//! let price = Money::parse_decimal("150").unwrap();
//! let total = price.multiply_quantity(15);
//! assert_eq!(total.to_string(), "2250.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pagination;
pub mod report;
pub mod request;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use pagination::{Page, PageRequest};
pub use report::Remainder;
pub use request::{AddInvoiceRequest, AddSaleRequest, ReceiveInventory, RecordSale};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Actor recorded on a stock log when neither the line nor the caller names one.
pub const DEFAULT_ACTOR: &str = "admin";

/// Maximum number of lines accepted in a single invoice or sale.
///
/// ## Business Reason
/// One batch is one transaction. Bounding it keeps the write lock short.
pub const MAX_BATCH_LINES: usize = 500;

/// Largest amount a single invoice or sale line may carry.
pub const MAX_LINE_AMOUNT: i64 = 1_000_000;

/// Page number used when the caller sends none (or garbage).
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the caller sends none (or garbage).
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Upper bound for a page size.
pub const MAX_PAGE_LIMIT: u32 = 100;
