//! # Validation Module
//!
//! Turns wire payloads into validated commands for the stock ledger.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: axum extractor                                               │
//! │  └── JSON shape (malformed bodies rejected before this module)         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (pure, fail-fast)                                │
//! │  ├── required fields, date, positive integers                          │
//! │  ├── prices: decimal text → Money, > 0, cost <= selling                │
//! │  └── actor fallback (line → principal → default)                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: StockLedger transaction (depot-db)                           │
//! │  ├── product existence                                                 │
//! │  ├── stock >= amount (conditional decrement)                           │
//! │  └── CHECK constraints                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first failing rule wins; nothing is collected.
//!
//! ## Usage
//! ```rust
//! use depot_core::request::{AddInvoiceItem, AddInvoiceRequest};
//! use depot_core::validation::validate_receive_request;
//!
//! let req = AddInvoiceRequest {
//!     source: Some("Supplier A".into()),
//!     date: Some("2024-03-01".into()),
//!     items: Some(vec![AddInvoiceItem {
//!         product_id: Some("p-1".into()),
//!         amount: Some(5.into()),
//!         cost_price: Some(100.into()),
//!         selling_price: Some(150.into()),
//!         added_by: None,
//!     }]),
//! };
//!
//! let cmd = validate_receive_request(&req, Some("alice"), "admin").unwrap();
//! assert_eq!(cmd.lines[0].added_by, "alice");
//! ```

use chrono::{DateTime, NaiveDate};
use serde_json::Number;

use crate::error::ValidationError;
use crate::money::Money;
use crate::request::{
    AddInvoiceRequest, AddSaleRequest, ReceiptLine, ReceiveInventory, RecordSale, SoldLine,
};
use crate::types::Currency;
use crate::{MAX_BATCH_LINES, MAX_LINE_AMOUNT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Batch Validators
// =============================================================================

/// Validates an invoice body.
///
/// `principal` is the authenticated caller, if any; `default_actor` is used
/// for `addedBy` when neither the line nor the principal supplies one.
pub fn validate_receive_request(
    req: &AddInvoiceRequest,
    principal: Option<&str>,
    default_actor: &str,
) -> ValidationResult<ReceiveInventory> {
    let source = validate_required_text("source", req.source.as_deref())?;
    let date = parse_invoice_date(req.date.as_deref())?;
    let items = req.items.as_deref().unwrap_or_default();
    validate_batch_size(items.len())?;

    let mut lines = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let field = |name: &str| format!("items[{i}].{name}");

        let product_id = validate_required_text(&field("productId"), item.product_id.as_deref())?;
        let amount = validate_amount(&field("amount"), item.amount.as_ref())?;
        let cost_price = validate_price(&field("costPrice"), item.cost_price.as_ref())?;
        let selling_price = validate_price(&field("sellingPrice"), item.selling_price.as_ref())?;
        validate_price_order(&format!("items[{i}]"), cost_price, selling_price)?;

        lines.push(ReceiptLine {
            product_id,
            amount,
            cost_price,
            selling_price,
            currency: Currency::Uzs,
            added_by: resolve_actor(item.added_by.as_deref(), principal, default_actor),
        });
    }

    Ok(ReceiveInventory {
        source,
        date,
        lines,
    })
}

/// Validates a sale body. `sold_by` is recorded on the sale and every line.
pub fn validate_sale_request(req: &AddSaleRequest, sold_by: &str) -> ValidationResult<RecordSale> {
    let items = req.items.as_deref().unwrap_or_default();
    validate_batch_size(items.len())?;

    let mut lines = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let field = |name: &str| format!("items[{i}].{name}");

        lines.push(SoldLine {
            product_id: validate_required_text(&field("productId"), item.product_id.as_deref())?,
            amount: validate_amount(&field("amount"), item.amount.as_ref())?,
            selling_price: validate_price(&field("sellingPrice"), item.selling_price.as_ref())?,
        });
    }

    Ok(RecordSale {
        sold_by: sold_by.to_string(),
        lines,
    })
}

// =============================================================================
// Field Validators
// =============================================================================

/// Trims and requires a non-empty string.
pub fn validate_required_text(field: &str, value: Option<&str>) -> ValidationResult<String> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ValidationError::Required {
            field: field.to_string(),
        }),
    }
}

/// Parses an invoice date.
///
/// Accepts `2024-03-01` or a full RFC 3339 timestamp, whose calendar date
/// (in its own offset) is kept.
///
/// ```rust
/// use depot_core::validation::parse_invoice_date;
///
/// assert!(parse_invoice_date(Some("2024-02-29")).is_ok());
/// assert!(parse_invoice_date(Some("2023-02-29")).is_err());
/// assert!(parse_invoice_date(Some("2024-03-01T10:00:00+05:00")).is_ok());
/// ```
pub fn parse_invoice_date(value: Option<&str>) -> ValidationResult<NaiveDate> {
    let text = validate_required_text("date", value)?;

    if let Ok(date) = NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(&text) {
        return Ok(timestamp.date_naive());
    }

    Err(ValidationError::InvalidFormat {
        field: "date".to_string(),
        reason: format!("'{text}' is not a valid calendar date"),
    })
}

/// Validates a line amount: a whole number in `1..=MAX_LINE_AMOUNT`.
pub fn validate_amount(field: &str, value: Option<&Number>) -> ValidationResult<i64> {
    let number = value.ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })?;

    let amount = match number.as_i64() {
        Some(amount) => amount,
        // u64 beyond i64::MAX
        None if number.is_u64() => i64::MAX,
        None => {
            return Err(ValidationError::MustBeInteger {
                field: field.to_string(),
            })
        }
    };

    if amount <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    if amount > MAX_LINE_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_LINE_AMOUNT,
        });
    }

    Ok(amount)
}

/// Validates a price: decimal text with at most two fraction digits, > 0.
pub fn validate_price(field: &str, value: Option<&Number>) -> ValidationResult<Money> {
    let number = value.ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })?;

    let price =
        Money::parse_decimal(&number.to_string()).map_err(|e| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: e.to_string(),
        })?;

    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(price)
}

/// Cost must not exceed selling price.
pub fn validate_price_order(field: &str, cost: Money, selling: Money) -> ValidationResult<()> {
    if cost > selling {
        return Err(ValidationError::CostExceedsSelling {
            field: field.to_string(),
            cost: cost.to_string(),
            selling: selling.to_string(),
        });
    }
    Ok(())
}

/// A batch needs at least one line and at most [`MAX_BATCH_LINES`].
pub fn validate_batch_size(len: usize) -> ValidationResult<()> {
    if len == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }
    if len > MAX_BATCH_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_BATCH_LINES as i64,
        });
    }
    Ok(())
}

/// Picks the actor for a stock log: explicit line value, then the
/// authenticated principal, then `default_actor`. Blank strings are absent.
///
/// ```rust
/// use depot_core::validation::resolve_actor;
///
/// assert_eq!(resolve_actor(Some("bob"), Some("alice"), "admin"), "bob");
/// assert_eq!(resolve_actor(Some("  "), Some("alice"), "admin"), "alice");
/// assert_eq!(resolve_actor(None, None, "admin"), "admin");
/// ```
pub fn resolve_actor(line: Option<&str>, principal: Option<&str>, default_actor: &str) -> String {
    [line, principal]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(default_actor)
        .to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
