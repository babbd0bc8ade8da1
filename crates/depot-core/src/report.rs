//! Remainder report: what is on the shelf and what it is worth.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Product;

/// One row of `GET /api/stock/remainders`.
///
/// `price` and `total` are fixed two-decimal strings (`"150.00"`), with no
/// thousands separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Remainder {
    pub name: String,
    pub quantity: i64,
    pub price: String,
    pub total: String,
}

impl Remainder {
    /// Projects a product: `total = stock × price`.
    pub fn from_product(product: &Product) -> Self {
        let price = product.price();
        Remainder {
            name: product.title.clone(),
            quantity: product.stock,
            price: price.to_string(),
            total: price.multiply_quantity(product.stock).to_string(),
        }
    }
}

impl From<&Product> for Remainder {
    fn from(product: &Product) -> Self {
        Remainder::from_product(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_remainder_formatting() {
        let now = Utc::now();
        let product = Product {
            id: "p".to_string(),
            title: "P".to_string(),
            description: None,
            price_minor: 15000,
            stock: 15,
            created_at: now,
            updated_at: now,
        };

        let row = Remainder::from(&product);
        assert_eq!(
            row,
            Remainder {
                name: "P".to_string(),
                quantity: 15,
                price: "150.00".to_string(),
                total: "2250.00".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_shelf_is_zero() {
        let now = Utc::now();
        let product = Product {
            id: "p".to_string(),
            title: "Elbow 90°".to_string(),
            description: None,
            price_minor: 1999,
            stock: 0,
            created_at: now,
            updated_at: now,
        };
        let row = Remainder::from_product(&product);
        assert_eq!(row.price, "19.99");
        assert_eq!(row.total, "0.00");
    }
}
