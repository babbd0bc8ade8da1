//! # Product Repository
//!
//! Catalog lookups and inserts.
//!
//! Stock is deliberately absent from this API: the only writers of
//! `products.stock` are [`StockLedger`](crate::StockLedger) transactions.
//! Inserting a product may set an opening stock (seed data, tests).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use depot_core::{Money, Product};

const PRODUCT_COLUMNS: &str = "id, title, description, price_minor, stock, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let valve = repo.create("Ball valve DN25", None, Money::from_major(150), 10).await?;
/// let found = repo.get_by_id(&valve.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists every product ordered by title.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY title, rowid");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Inserts a fully built product.
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, title = %product.title, "Inserting product");

        if product.stock < 0 {
            return Err(DbError::CheckViolation {
                message: format!("opening stock {} is negative", product.stock),
            });
        }

        sqlx::query(
            r#"
            INSERT INTO products (
                id, title, description, price_minor, stock, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.price_minor)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Builds and inserts a product with a fresh id.
    pub async fn create(
        &self,
        title: &str,
        description: Option<&str>,
        price: Money,
        opening_stock: i64,
    ) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            title: title.to_string(),
            description: description.map(str::to_string),
            price_minor: price.minor(),
            stock: opening_stock,
            created_at: now,
            updated_at: now,
        };

        self.insert(&product).await
    }

    /// Current stock, or `None` if the product does not exist.
    pub async fn stock_of(&self, id: &str) -> DbResult<Option<i64>> {
        let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(stock)
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}
