//! # Error Types
//!
//! Domain-specific error types for depot-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  depot-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Malformed or missing input                     │
//! │                                                                         │
//! │  depot-db errors (separate crate)                                      │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── LedgerError      - CoreError | DbError from a batch               │
//! │                                                                         │
//! │  API errors (apps/api)                                                 │
//! │  └── ApiError         - What the frontend sees (code + message)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised while applying a batch.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A line references a product that does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Selling more than is on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// add-sale [{P, amount: 20}]
    ///      │
    ///      ▼
    /// UPDATE ... WHERE stock >= 20   → 0 rows
    ///      │
    ///      ▼
    /// InsufficientStock { title: "P", available: 15, requested: 20 }
    ///      │
    ///      ▼
    /// Whole sale rolled back, 400 to the caller
    /// ```
    #[error("Insufficient stock for {title}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        title: String,
        available: i64,
        requested: i64,
    },

    /// Invoice lookup by id found nothing.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    /// Sale lookup by id found nothing.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Field names are the wire names (`items[2].costPrice`) so the message can
/// be shown to the admin user unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be a whole number.
    #[error("{field} must be a whole number")]
    MustBeInteger { field: String },

    /// Invalid format (e.g., invalid date, unparsable price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Cost price above selling price on one line.
    #[error("{field}: cost price {cost} cannot exceed selling price {selling}")]
    CostExceedsSelling {
        field: String,
        cost: String,
        selling: String,
    },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

// =============================================================================
// Unit Tests
// =============================================================================
