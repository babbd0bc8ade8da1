//! # Domain Types
//!
//! Entities of the stock ledger as they leave the service.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌─────────────────┐                         │
//! │  │    Invoice      │ 1    N │  InvoiceLine    │ N    1 ┌─────────────┐ │
//! │  │  source, date   │───────►│  (stock log)    │───────►│   Product   │ │
//! │  └─────────────────┘        └─────────────────┘        │  title      │ │
//! │                                                        │  price      │ │
//! │  ┌─────────────────┐        ┌─────────────────┐        │  stock      │ │
//! │  │      Sale       │ 1    N │    SaleLine     │ N    1 │             │ │
//! │  │  soldBy, date   │───────►│   (sale log)    │───────►│             │ │
//! │  └─────────────────┘        └─────────────────┘        └─────────────┘ │
//! │                                                                         │
//! │  Invoices, sales and their lines are append-only.                       │
//! │  Product.stock is the only field the ledger ever mutates.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All monetary fields are integer minor units (`*_minor`), see [`Money`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Currency
// =============================================================================

/// Currencies a stock log may be recorded in. Only one is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Uzbekistani som.
    #[default]
    Uzs,
}

impl Currency {
    /// ISO 4217 code.
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::Uzs => "UZS",
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog item with its authoritative on-hand quantity.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, used as `name` in the remainders report.
    pub title: String,

    pub description: Option<String>,

    /// Unit price in minor units.
    pub price_minor: i64,

    /// Current stock. Never negative after a committed batch.
    pub stock: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_minor(self.price_minor)
    }
}

/// The slice of a product embedded in ledger lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductRef {
    pub id: String,
    pub title: String,
}

// =============================================================================
// Invoice / Stock Log
// =============================================================================

/// One received line of an invoice (a stock log row).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub id: String,
    /// 0-based position inside the invoice.
    pub line_no: i64,
    pub product: ProductRef,
    pub amount: i64,
    pub cost_price_minor: i64,
    pub selling_price_minor: i64,
    pub currency: Currency,
    pub added_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A dated, sourced batch of stock receipts.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub source: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Lines in the order they were submitted.
    pub items: Vec<InvoiceLine>,
}

impl Invoice {
    /// Sum of received quantities.
    pub fn total_amount(&self) -> i64 {
        self.items.iter().map(|line| line.amount).sum()
    }
}

/// Invoice header embedded in the flat stock-log view.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceRef {
    pub id: String,
    pub source: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
}

/// Flat stock-log row for the `history-items` view.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockLogEntry {
    pub id: String,
    pub product: ProductRef,
    pub amount: i64,
    pub cost_price_minor: i64,
    pub selling_price_minor: i64,
    pub currency: Currency,
    pub added_by: String,
    pub invoice: InvoiceRef,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale / Sale Log
// =============================================================================

/// One sold line of a sale (a sale log row).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub id: String,
    pub line_no: i64,
    pub product: ProductRef,
    pub amount: i64,
    pub selling_price_minor: i64,
    pub sold_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleLine {
    /// amount × selling price.
    pub fn line_total(&self) -> Money {
        Money::from_minor(self.selling_price_minor).multiply_quantity(self.amount)
    }
}

/// A batch of sold lines recorded as one transaction.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub sold_by: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub items: Vec<SaleLine>,
}

impl Sale {
    /// Revenue of the whole sale.
    pub fn total(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(), |acc, line| acc + line.line_total())
    }
}

/// Flat sale-log row for the `sales-items` view.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleLogEntry {
    pub id: String,
    pub sale_id: String,
    pub product: ProductRef,
    pub amount: i64,
    pub selling_price_minor: i64,
    pub sold_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(amount: i64, price_minor: i64) -> SaleLine {
        SaleLine {
            id: "l".to_string(),
            line_no: 0,
            product: ProductRef {
                id: "p".to_string(),
                title: "Gate valve".to_string(),
            },
            amount,
            selling_price_minor: price_minor,
            sold_by: "admin".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_currency_wire_code() {
        assert_eq!(Currency::default(), Currency::Uzs);
        assert_eq!(Currency::Uzs.code(), "UZS");
        assert_eq!(serde_json::to_string(&Currency::Uzs).unwrap(), "\"UZS\"");
    }

    #[test]
    fn test_sale_total() {
        let sale = Sale {
            id: "s".to_string(),
            sold_by: "admin".to_string(),
            date: Utc::now(),
            items: vec![line(2, 15000), line(1, 500)],
        };
        assert_eq!(sale.total().minor(), 30500);
    }

    #[test]
    fn test_product_serializes_camel_case() {
        let now = Utc::now();
        let product = Product {
            id: "p".to_string(),
            title: "Check valve".to_string(),
            description: None,
            price_minor: 15000,
            stock: 3,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["priceMinor"], 15000);
        assert_eq!(json["stock"], 3);
        assert_eq!(product.price().to_string(), "150.00");
    }
}
