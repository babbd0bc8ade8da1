//! # Request Payloads and Commands
//!
//! Two shapes for each mutating operation:
//!
//! ```text
//! AddInvoiceRequest ──validate_receive_request──► ReceiveInventory
//!   (wire, every field optional)                    (checked, typed)
//!
//! AddSaleRequest    ──validate_sale_request─────► RecordSale
//! ```
//!
//! The wire types accept anything JSON-shaped so that a missing field
//! surfaces as a [`ValidationError`](crate::ValidationError) naming the
//! field, not as an opaque deserialization failure. Numbers stay
//! `serde_json::Number` until validation reads their decimal text.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::money::Money;
use crate::types::Currency;

// =============================================================================
// Wire Payloads
// =============================================================================

/// Body of `POST /api/stock/add-invoice`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddInvoiceRequest {
    pub source: Option<String>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub date: Option<String>,
    pub items: Option<Vec<AddInvoiceItem>>,
}

/// One line of an incoming invoice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddInvoiceItem {
    pub product_id: Option<String>,
    pub amount: Option<Number>,
    pub cost_price: Option<Number>,
    pub selling_price: Option<Number>,
    pub added_by: Option<String>,
}

/// Body of `POST /api/stock/add-sale`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSaleRequest {
    pub items: Option<Vec<AddSaleItem>>,
}

/// One line of an incoming sale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSaleItem {
    pub product_id: Option<String>,
    pub amount: Option<Number>,
    pub selling_price: Option<Number>,
}

// =============================================================================
// Validated Commands
// =============================================================================

/// A fully validated invoice, ready for the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveInventory {
    pub source: String,
    pub date: NaiveDate,
    pub lines: Vec<ReceiptLine>,
}

impl ReceiveInventory {
    /// Sum of all line amounts, i.e. the total stock delta.
    pub fn total_amount(&self) -> i64 {
        self.lines.iter().map(|line| line.amount).sum()
    }
}

/// A validated invoice line. `cost_price <= selling_price` holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLine {
    pub product_id: String,
    pub amount: i64,
    pub cost_price: Money,
    pub selling_price: Money,
    pub currency: Currency,
    pub added_by: String,
}

/// A fully validated sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSale {
    pub sold_by: String,
    pub lines: Vec<SoldLine>,
}

/// A validated sale line. Stock sufficiency is checked by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoldLine {
    pub product_id: String,
    pub amount: i64,
    pub selling_price: Money,
}
