//! Remainder report queries.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::product::ProductRepository;
use depot_core::{Money, Remainder};

/// Read-only reporting over the product store.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// One row per product: name, quantity, price and stock value.
    pub async fn remainders(&self) -> DbResult<Vec<Remainder>> {
        let products = ProductRepository::new(self.pool.clone()).list_all().await?;
        debug!(count = products.len(), "Building remainders");

        Ok(products.iter().map(Remainder::from_product).collect())
    }

    /// Sum of `stock × price` over the catalog.
    pub async fn stock_value(&self) -> DbResult<Money> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(stock * price_minor), 0) FROM products")
                .fetch_one(&self.pool)
                .await?;

        Ok(Money::from_minor(total))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use depot_core::Money;

    #[tokio::test]
    async fn test_remainders_and_stock_value() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .create("Manifold DN25", None, Money::from_major(150), 15)
            .await
            .unwrap();
        db.products()
            .create("Air vent DN15", None, Money::from_minor(1_250), 4)
            .await
            .unwrap();

        let rows = db.reports().remainders().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Air vent DN15");
        assert_eq!(rows[0].total, "50.00");
        assert_eq!(rows[1].price, "150.00");
        assert_eq!(rows[1].total, "2250.00");

        assert_eq!(db.reports().stock_value().await.unwrap(), Money::from_major(2_300));
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.reports().remainders().await.unwrap().is_empty());
        assert_eq!(db.reports().stock_value().await.unwrap(), Money::zero());
    }
}
