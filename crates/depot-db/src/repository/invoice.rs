//! # Invoice Repository
//!
//! Read side of receiving: invoice history and the flat stock-log view.
//!
//! ## Expansion
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /history?page=2&limit=10                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. SELECT COUNT(*) FROM invoices                  → total              │
//! │  2. SELECT headers ORDER BY date DESC LIMIT/OFFSET → 10 invoices        │
//! │  3. SELECT stock_logs JOIN products                                     │
//! │       WHERE invoice_id IN (10 ids) ORDER BY line_no                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Page<Invoice> { data: [Invoice { items: [InvoiceLine { product }] }] } │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Three queries per page regardless of size, all inside one read
//! transaction so `total` and `data` come from the same snapshot.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use depot_core::{
    Currency, Invoice, InvoiceLine, InvoiceRef, Page, PageRequest, ProductRef, StockLogEntry,
};

const LINE_COLUMNS: &str = r#"
    s.id, s.invoice_id, s.line_no, s.product_id,
    COALESCE(p.title, '') AS product_title,
    s.amount, s.cost_price_minor, s.selling_price_minor,
    s.currency, s.added_by, s.created_at
"#;

#[derive(Debug, FromRow)]
struct InvoiceRow {
    id: String,
    source: String,
    date: NaiveDate,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct StockLogRow {
    id: String,
    invoice_id: String,
    line_no: i64,
    product_id: String,
    product_title: String,
    amount: i64,
    cost_price_minor: i64,
    selling_price_minor: i64,
    currency: Currency,
    added_by: String,
    created_at: DateTime<Utc>,
}

impl StockLogRow {
    fn into_line(self) -> (String, InvoiceLine) {
        let line = InvoiceLine {
            id: self.id,
            line_no: self.line_no,
            product: ProductRef {
                id: self.product_id,
                title: self.product_title,
            },
            amount: self.amount,
            cost_price_minor: self.cost_price_minor,
            selling_price_minor: self.selling_price_minor,
            currency: self.currency,
            added_by: self.added_by,
            created_at: self.created_at,
        };
        (self.invoice_id, line)
    }
}

#[derive(Debug, FromRow)]
struct StockLogEntryRow {
    #[sqlx(flatten)]
    log: StockLogRow,
    invoice_source: String,
    invoice_date: NaiveDate,
}

impl From<StockLogEntryRow> for StockLogEntry {
    fn from(row: StockLogEntryRow) -> Self {
        let (invoice_id, line) = row.log.into_line();
        StockLogEntry {
            id: line.id,
            product: line.product,
            amount: line.amount,
            cost_price_minor: line.cost_price_minor,
            selling_price_minor: line.selling_price_minor,
            currency: line.currency,
            added_by: line.added_by,
            invoice: InvoiceRef {
                id: invoice_id,
                source: row.invoice_source,
                date: row.invoice_date,
            },
            created_at: line.created_at,
        }
    }
}

/// Repository for invoice and stock-log reads.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Paginated invoice history, newest invoice date first.
    pub async fn list(&self, request: PageRequest) -> DbResult<Page<Invoice>> {
        debug!(page = request.page(), limit = request.limit(), "Listing invoices");

        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(&mut *tx)
            .await?;

        let headers: Vec<InvoiceRow> = sqlx::query_as(
            r#"
            SELECT id, source, date, created_at
            FROM invoices
            ORDER BY date DESC, created_at DESC, rowid DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(i64::from(request.limit()))
        .bind(request.offset())
        .fetch_all(&mut *tx)
        .await?;

        let invoices = expand(&mut tx, headers).await?;
        tx.commit().await?;

        Ok(Page::new(invoices, total, request))
    }

    /// One invoice with its lines.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let mut tx = self.pool.begin().await?;

        let header: Option<InvoiceRow> =
            sqlx::query_as("SELECT id, source, date, created_at FROM invoices WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let invoice = match header {
            Some(header) => expand(&mut tx, vec![header]).await?.pop(),
            None => None,
        };
        tx.commit().await?;

        Ok(invoice)
    }

    /// Paginated flat stock-log view, newest first.
    pub async fn list_stock_logs(&self, request: PageRequest) -> DbResult<Page<StockLogEntry>> {
        debug!(page = request.page(), limit = request.limit(), "Listing stock logs");

        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_logs")
            .fetch_one(&mut *tx)
            .await?;

        let sql = format!(
            r#"
            SELECT {LINE_COLUMNS},
                i.source AS invoice_source,
                i.date AS invoice_date
            FROM stock_logs s
            JOIN invoices i ON i.id = s.invoice_id
            LEFT JOIN products p ON p.id = s.product_id
            ORDER BY s.created_at DESC, s.rowid DESC
            LIMIT ?1 OFFSET ?2
            "#
        );
        let rows: Vec<StockLogEntryRow> = sqlx::query_as(&sql)
            .bind(i64::from(request.limit()))
            .bind(request.offset())
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        let entries = rows.into_iter().map(StockLogEntry::from).collect();
        Ok(Page::new(entries, total, request))
    }

    /// Counts invoices.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Counts stock-log rows.
    pub async fn count_stock_logs(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Attaches lines to headers, keeping header order.
async fn expand(conn: &mut SqliteConnection, headers: Vec<InvoiceRow>) -> DbResult<Vec<Invoice>> {
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<StockLogRow> = {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {LINE_COLUMNS} FROM stock_logs s \
             LEFT JOIN products p ON p.id = s.product_id \
             WHERE s.invoice_id IN ("
        ));
        let mut ids = qb.separated(", ");
        for header in &headers {
            ids.push_bind(header.id.as_str());
        }
        ids.push_unseparated(") ORDER BY s.invoice_id, s.line_no");

        qb.build_query_as().fetch_all(&mut *conn).await?
    };

    let mut lines: HashMap<String, Vec<InvoiceLine>> = HashMap::new();
    for row in rows {
        let (invoice_id, line) = row.into_line();
        lines.entry(invoice_id).or_default().push(line);
    }

    Ok(headers
        .into_iter()
        .map(|h| Invoice {
            items: lines.remove(&h.id).unwrap_or_default(),
            id: h.id,
            source: h.source,
            date: h.date,
            created_at: h.created_at,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use depot_core::request::{ReceiptLine, ReceiveInventory};
    use depot_core::Money;

    async fn receive(db: &Database, product_id: &str, day: u32, amount: i64) -> Invoice {
        let cmd = ReceiveInventory {
            source: format!("Supplier {day}"),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            lines: vec![ReceiptLine {
                product_id: product_id.to_string(),
                amount,
                cost_price: Money::from_major(100),
                selling_price: Money::from_major(150),
                currency: Currency::Uzs,
                added_by: "admin".to_string(),
            }],
        };
        db.ledger().receive_invoice(&cmd).await.unwrap()
    }

    #[tokio::test]
    async fn test_second_page_of_25() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = db
            .products()
            .create("P", None, Money::from_major(150), 0)
            .await
            .unwrap();
        for day in 1..=25 {
            receive(&db, &p.id, day, 1).await;
        }

        let page = db
            .invoices()
            .list(PageRequest::from_raw(Some("2"), Some("10")))
            .await
            .unwrap();

        assert_eq!(page.data.len(), 10);
        assert_eq!(page.total, 25);
        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 10);
        // Newest date first: page 2 starts at the 11th newest (Jan 15)
        assert_eq!(page.data[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert!(page.data.iter().all(|inv| inv.items.len() == 1));
        assert_eq!(page.data[0].items[0].product.title, "P");

        let last = db
            .invoices()
            .list(PageRequest::new(3, 10))
            .await
            .unwrap();
        assert_eq!(last.data.len(), 5);
    }

    #[tokio::test]
    async fn test_stock_log_view_carries_invoice() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = db
            .products()
            .create("Gate valve", None, Money::from_major(150), 0)
            .await
            .unwrap();
        let first = receive(&db, &p.id, 3, 2).await;
        let second = receive(&db, &p.id, 4, 5).await;

        let page = db.invoices().list_stock_logs(PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 2);
        // Newest first
        assert_eq!(page.data[0].invoice.id, second.id);
        assert_eq!(page.data[0].amount, 5);
        assert_eq!(page.data[1].invoice.id, first.id);
        assert_eq!(page.data[1].invoice.source, "Supplier 3");
        assert_eq!(page.data[1].product.title, "Gate valve");
    }

    #[tokio::test]
    async fn test_page_total_matches_rows_under_concurrent_receiving() {
        let path = std::env::temp_dir().join(format!("depot-history-{}.db", uuid::Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(4))
            .await
            .unwrap();
        let p = db
            .products()
            .create("Elbow DN20", None, Money::from_major(150), 0)
            .await
            .unwrap();

        let mut writers = Vec::new();
        for day in 1..=15 {
            let db = db.clone();
            let id = p.id.clone();
            writers.push(tokio::spawn(async move { receive(&db, &id, day, 1).await }));
        }

        let mut readers = Vec::new();
        for _ in 0..15 {
            let repo = db.invoices();
            readers.push(tokio::spawn(async move {
                let page = repo.list(PageRequest::new(1, 100)).await.unwrap();
                let logs = repo.list_stock_logs(PageRequest::new(1, 100)).await.unwrap();
                (page, logs)
            }));
        }

        for reader in readers {
            let (page, logs) = reader.await.unwrap();
            assert_eq!(page.data.len() as i64, page.total);
            assert!(page.data.iter().all(|inv| inv.items.len() == 1));
            assert_eq!(logs.data.len() as i64, logs.total);
        }
        for writer in writers {
            writer.await.unwrap();
        }
        assert_eq!(db.invoices().count().await.unwrap(), 15);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test]
    async fn test_empty_history_and_missing_invoice() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let page = db.invoices().list(PageRequest::default()).await.unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total, 0);
        assert!(db.invoices().get_by_id("nope").await.unwrap().is_none());
    }
}
