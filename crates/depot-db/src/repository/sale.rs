//! # Sale Repository
//!
//! Read side of selling: sale history and the flat sale-log view.
//! Sales are written only by [`StockLedger::record_sale`](crate::StockLedger::record_sale).
//! Each read runs in one transaction, so a page and its `total` agree.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use depot_core::{Page, PageRequest, ProductRef, Sale, SaleLine, SaleLogEntry};

const LINE_COLUMNS: &str = r#"
    l.id, l.sale_id, l.line_no, l.product_id,
    COALESCE(p.title, '') AS product_title,
    l.amount, l.selling_price_minor, l.sold_by, l.created_at
"#;

#[derive(Debug, FromRow)]
struct SaleRow {
    id: String,
    sold_by: String,
    date: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct SaleLogRow {
    id: String,
    sale_id: String,
    line_no: i64,
    product_id: String,
    product_title: String,
    amount: i64,
    selling_price_minor: i64,
    sold_by: String,
    created_at: DateTime<Utc>,
}

impl SaleLogRow {
    fn into_line(self) -> (String, SaleLine) {
        let line = SaleLine {
            id: self.id,
            line_no: self.line_no,
            product: ProductRef {
                id: self.product_id,
                title: self.product_title,
            },
            amount: self.amount,
            selling_price_minor: self.selling_price_minor,
            sold_by: self.sold_by,
            created_at: self.created_at,
        };
        (self.sale_id, line)
    }
}

impl From<SaleLogRow> for SaleLogEntry {
    fn from(row: SaleLogRow) -> Self {
        let (sale_id, line) = row.into_line();
        SaleLogEntry {
            id: line.id,
            sale_id,
            product: line.product,
            amount: line.amount,
            selling_price_minor: line.selling_price_minor,
            sold_by: line.sold_by,
            created_at: line.created_at,
        }
    }
}

/// Repository for sale and sale-log reads.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Paginated sale history, newest first.
    pub async fn list(&self, request: PageRequest) -> DbResult<Page<Sale>> {
        debug!(page = request.page(), limit = request.limit(), "Listing sales");

        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&mut *tx)
            .await?;

        let headers: Vec<SaleRow> = sqlx::query_as(
            r#"
            SELECT id, sold_by, date
            FROM sales
            ORDER BY date DESC, rowid DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(i64::from(request.limit()))
        .bind(request.offset())
        .fetch_all(&mut *tx)
        .await?;

        let sales = expand(&mut tx, headers).await?;
        tx.commit().await?;

        Ok(Page::new(sales, total, request))
    }

    /// Gets a sale by ID, with its lines.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let mut tx = self.pool.begin().await?;

        let header: Option<SaleRow> =
            sqlx::query_as("SELECT id, sold_by, date FROM sales WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let sale = match header {
            Some(header) => expand(&mut tx, vec![header]).await?.pop(),
            None => None,
        };
        tx.commit().await?;

        Ok(sale)
    }

    /// Paginated flat sale-log view, newest first.
    pub async fn list_sale_logs(&self, request: PageRequest) -> DbResult<Page<SaleLogEntry>> {
        debug!(page = request.page(), limit = request.limit(), "Listing sale logs");

        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_logs")
            .fetch_one(&mut *tx)
            .await?;

        let sql = format!(
            r#"
            SELECT {LINE_COLUMNS}
            FROM sale_logs l
            LEFT JOIN products p ON p.id = l.product_id
            ORDER BY l.created_at DESC, l.rowid DESC
            LIMIT ?1 OFFSET ?2
            "#
        );
        let rows: Vec<SaleLogRow> = sqlx::query_as(&sql)
            .bind(i64::from(request.limit()))
            .bind(request.offset())
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        let entries = rows.into_iter().map(SaleLogEntry::from).collect();
        Ok(Page::new(entries, total, request))
    }

    /// Counts sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Counts sale-log rows.
    pub async fn count_sale_logs(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn expand(conn: &mut SqliteConnection, headers: Vec<SaleRow>) -> DbResult<Vec<Sale>> {
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<SaleLogRow> = {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {LINE_COLUMNS} FROM sale_logs l \
             LEFT JOIN products p ON p.id = l.product_id \
             WHERE l.sale_id IN ("
        ));
        let mut ids = qb.separated(", ");
        for header in &headers {
            ids.push_bind(header.id.as_str());
        }
        ids.push_unseparated(") ORDER BY l.sale_id, l.line_no");

        qb.build_query_as().fetch_all(&mut *conn).await?
    };

    let mut lines: HashMap<String, Vec<SaleLine>> = HashMap::new();
    for row in rows {
        let (sale_id, line) = row.into_line();
        lines.entry(sale_id).or_default().push(line);
    }

    Ok(headers
        .into_iter()
        .map(|h| Sale {
            items: lines.remove(&h.id).unwrap_or_default(),
            id: h.id,
            sold_by: h.sold_by,
            date: h.date,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use depot_core::request::{RecordSale, SoldLine};
    use depot_core::Money;

    #[tokio::test]
    async fn test_sale_history_and_logs() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = db
            .products()
            .create("Coupling 32mm", None, Money::from_major(12), 20)
            .await
            .unwrap();

        let mut ids = Vec::new();
        for amount in [1, 2, 3] {
            let cmd = RecordSale {
                sold_by: "cashier".to_string(),
                lines: vec![SoldLine {
                    product_id: p.id.clone(),
                    amount,
                    selling_price: Money::from_major(12),
                }],
            };
            ids.push(db.ledger().record_sale(&cmd).await.unwrap().id);
        }

        let page = db.sales().list(PageRequest::new(1, 2)).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].id, ids[2]);
        assert_eq!(page.data[0].items[0].product.title, "Coupling 32mm");

        let logs = db.sales().list_sale_logs(PageRequest::default()).await.unwrap();
        assert_eq!(logs.total, 3);
        assert_eq!(logs.data[0].sale_id, ids[2]);
        assert_eq!(logs.data[0].amount, 3);
        assert_eq!(logs.data[2].sold_by, "cashier");
    }

    #[tokio::test]
    async fn test_missing_sale() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.sales().get_by_id("nope").await.unwrap().is_none());
    }
}
