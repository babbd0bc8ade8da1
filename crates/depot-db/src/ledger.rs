//! # Stock Ledger
//!
//! The only code that changes `products.stock`. Each invoice or sale is one
//! SQLite transaction: header, every log row and every stock change commit
//! together or not at all.
//!
//! ## Receive Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  receive_invoice(ReceiveInventory { source, date, lines })              │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    INSERT invoices                              (takes the write lock)  │
//! │    for each line:                                                       │
//! │      UPDATE products SET stock = stock + amount                         │
//! │        WHERE id = ? RETURNING title        ── no row ─► ProductNotFound │
//! │      INSERT stock_logs (invoice_id, line_no, ...)                       │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error: the Transaction is dropped uncommitted → ROLLBACK           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_sale(RecordSale { sold_by, lines })                             │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    INSERT sales                                                         │
//! │    for each line:                                                       │
//! │      UPDATE products SET stock = stock - amount                         │
//! │        WHERE id = ? AND stock >= amount RETURNING title                 │
//! │        │                                                                │
//! │        ├── row  → INSERT sale_logs                                      │
//! │        └── none → SELECT title, stock → ProductNotFound                 │
//! │                                          | InsufficientStock            │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The check and the decrement are one statement, so two concurrent sales
//! of the last units cannot both succeed. Each transaction writes before
//! it reads, so a competing writer waits on the busy timeout instead of
//! failing a lock upgrade.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult, LedgerResult};
use depot_core::{
    CoreError, Invoice, InvoiceLine, ProductRef, ReceiveInventory, RecordSale, Sale, SaleLine,
};

/// Transactional writer for invoices and sales.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    /// Applies a validated invoice: one invoice, N stock logs, N increments.
    ///
    /// ## Errors
    /// - `CoreError::ProductNotFound` if any line names an unknown product
    /// - `DbError` on storage failure
    ///
    /// On error nothing is persisted.
    pub async fn receive_invoice(&self, command: &ReceiveInventory) -> LedgerResult<Invoice> {
        debug!(
            source = %command.source,
            date = %command.date,
            lines = command.lines.len(),
            "Receiving invoice"
        );

        let result = self.apply_invoice(command).await;
        match &result {
            Ok(invoice) => info!(
                invoice_id = %invoice.id,
                lines = invoice.items.len(),
                total_amount = invoice.total_amount(),
                "Invoice committed"
            ),
            Err(e) => warn!(error = %e, source = %command.source, "Invoice rejected, rolled back"),
        }
        result
    }

    /// Applies a validated sale: one sale, N sale logs, N guarded decrements.
    ///
    /// ## Errors
    /// - `CoreError::ProductNotFound` if any line names an unknown product
    /// - `CoreError::InsufficientStock` if any line asks for more than is on hand
    /// - `DbError` on storage failure
    ///
    /// On error nothing is persisted.
    pub async fn record_sale(&self, command: &RecordSale) -> LedgerResult<Sale> {
        debug!(sold_by = %command.sold_by, lines = command.lines.len(), "Recording sale");

        let result = self.apply_sale(command).await;
        match &result {
            Ok(sale) => info!(
                sale_id = %sale.id,
                lines = sale.items.len(),
                total = %sale.total(),
                "Sale committed"
            ),
            Err(e) => warn!(error = %e, sold_by = %command.sold_by, "Sale rejected, rolled back"),
        }
        result
    }

    async fn apply_invoice(&self, command: &ReceiveInventory) -> LedgerResult<Invoice> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let now = Utc::now();
        let invoice_id = Uuid::new_v4().to_string();
        insert_invoice(&mut tx, &invoice_id, &command.source, command.date, now).await?;

        let mut items = Vec::with_capacity(command.lines.len());
        for (line_no, line) in command.lines.iter().enumerate() {
            let title = increment_stock(&mut tx, &line.product_id, line.amount, now)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            let item = InvoiceLine {
                id: Uuid::new_v4().to_string(),
                line_no: line_no as i64,
                product: ProductRef {
                    id: line.product_id.clone(),
                    title,
                },
                amount: line.amount,
                cost_price_minor: line.cost_price.minor(),
                selling_price_minor: line.selling_price.minor(),
                currency: line.currency,
                added_by: line.added_by.clone(),
                created_at: now,
            };
            insert_stock_log(&mut tx, &invoice_id, &item).await?;
            items.push(item);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(Invoice {
            id: invoice_id,
            source: command.source.clone(),
            date: command.date,
            created_at: now,
            items,
        })
    }

    async fn apply_sale(&self, command: &RecordSale) -> LedgerResult<Sale> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let now = Utc::now();
        let sale_id = Uuid::new_v4().to_string();
        insert_sale(&mut tx, &sale_id, &command.sold_by, now).await?;

        let mut items = Vec::with_capacity(command.lines.len());
        for (line_no, line) in command.lines.iter().enumerate() {
            let title = match decrement_stock(&mut tx, &line.product_id, line.amount, now).await? {
                Some(title) => title,
                None => {
                    return Err(
                        explain_failed_decrement(&mut tx, &line.product_id, line.amount)
                            .await?
                            .into(),
                    )
                }
            };

            let item = SaleLine {
                id: Uuid::new_v4().to_string(),
                line_no: line_no as i64,
                product: ProductRef {
                    id: line.product_id.clone(),
                    title,
                },
                amount: line.amount,
                selling_price_minor: line.selling_price.minor(),
                sold_by: command.sold_by.clone(),
                created_at: now,
            };
            insert_sale_log(&mut tx, &sale_id, &item).await?;
            items.push(item);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(Sale {
            id: sale_id,
            sold_by: command.sold_by.clone(),
            date: now,
            items,
        })
    }
}

// =============================================================================
// Statements (run on the transaction's connection)
// =============================================================================

async fn insert_invoice(
    conn: &mut SqliteConnection,
    id: &str,
    source: &str,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query("INSERT INTO invoices (id, source, date, created_at) VALUES (?1, ?2, ?3, ?4)")
        .bind(id)
        .bind(source)
        .bind(date)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn insert_stock_log(
    conn: &mut SqliteConnection,
    invoice_id: &str,
    line: &InvoiceLine,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_logs (
            id, invoice_id, line_no, product_id, amount,
            cost_price_minor, selling_price_minor, currency, added_by, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&line.id)
    .bind(invoice_id)
    .bind(line.line_no)
    .bind(&line.product.id)
    .bind(line.amount)
    .bind(line.cost_price_minor)
    .bind(line.selling_price_minor)
    .bind(line.currency)
    .bind(&line.added_by)
    .bind(line.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_sale(
    conn: &mut SqliteConnection,
    id: &str,
    sold_by: &str,
    now: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query("INSERT INTO sales (id, sold_by, date, created_at) VALUES (?1, ?2, ?3, ?3)")
        .bind(id)
        .bind(sold_by)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn insert_sale_log(
    conn: &mut SqliteConnection,
    sale_id: &str,
    line: &SaleLine,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_logs (
            id, sale_id, line_no, product_id, amount,
            selling_price_minor, sold_by, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&line.id)
    .bind(sale_id)
    .bind(line.line_no)
    .bind(&line.product.id)
    .bind(line.amount)
    .bind(line.selling_price_minor)
    .bind(&line.sold_by)
    .bind(line.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Returns the product title, or `None` if the product does not exist.
async fn increment_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    amount: i64,
    now: DateTime<Utc>,
) -> DbResult<Option<String>> {
    let title: Option<String> = sqlx::query_scalar(
        r#"
        UPDATE products
        SET stock = stock + ?2, updated_at = ?3
        WHERE id = ?1
        RETURNING title
        "#,
    )
    .bind(product_id)
    .bind(amount)
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(title)
}

/// Returns the product title, or `None` if the product is missing or short.
async fn decrement_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    amount: i64,
    now: DateTime<Utc>,
) -> DbResult<Option<String>> {
    let title: Option<String> = sqlx::query_scalar(
        r#"
        UPDATE products
        SET stock = stock - ?2, updated_at = ?3
        WHERE id = ?1 AND stock >= ?2
        RETURNING title
        "#,
    )
    .bind(product_id)
    .bind(amount)
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(title)
}

/// Tells a missing product apart from short stock, inside the same transaction.
async fn explain_failed_decrement(
    conn: &mut SqliteConnection,
    product_id: &str,
    requested: i64,
) -> DbResult<CoreError> {
    let row: Option<(String, i64)> =
        sqlx::query_as("SELECT title, stock FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(match row {
        None => CoreError::ProductNotFound(product_id.to_string()),
        Some((title, available)) => CoreError::InsufficientStock {
            product_id: product_id.to_string(),
            title,
            available,
            requested,
        },
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::{Database, DbConfig};
    use depot_core::request::{ReceiptLine, SoldLine};
    use depot_core::{Currency, Money, Product, Remainder};

    async fn setup() -> (Database, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .create("P", None, Money::from_major(150), 10)
            .await
            .unwrap();
        (db, product)
    }

    fn receipt(product_id: &str, amount: i64, cost: i64, selling: i64) -> ReceiptLine {
        ReceiptLine {
            product_id: product_id.to_string(),
            amount,
            cost_price: Money::from_major(cost),
            selling_price: Money::from_major(selling),
            currency: Currency::Uzs,
            added_by: "admin".to_string(),
        }
    }

    fn invoice(lines: Vec<ReceiptLine>) -> ReceiveInventory {
        ReceiveInventory {
            source: "Supplier A".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            lines,
        }
    }

    fn sale(lines: Vec<(&str, i64)>) -> RecordSale {
        RecordSale {
            sold_by: "cashier".to_string(),
            lines: lines
                .into_iter()
                .map(|(id, amount)| SoldLine {
                    product_id: id.to_string(),
                    amount,
                    selling_price: Money::from_major(150),
                })
                .collect(),
        }
    }

    async fn stock(db: &Database, id: &str) -> i64 {
        db.products().stock_of(id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_receive_then_oversell_scenario() {
        let (db, p) = setup().await;

        let created = db
            .ledger()
            .receive_invoice(&invoice(vec![receipt(&p.id, 5, 100, 150)]))
            .await
            .unwrap();
        assert_eq!(created.items.len(), 1);
        assert_eq!(created.items[0].product.title, "P");
        assert_eq!(stock(&db, &p.id).await, 15);
        assert_eq!(db.invoices().count().await.unwrap(), 1);
        assert_eq!(db.invoices().count_stock_logs().await.unwrap(), 1);

        let err = db
            .ledger()
            .record_sale(&sale(vec![(p.id.as_str(), 20)]))
            .await
            .unwrap_err();
        match err {
            LedgerError::Core(CoreError::InsufficientStock {
                title,
                available,
                requested,
                ..
            }) => {
                assert_eq!(title, "P");
                assert_eq!(available, 15);
                assert_eq!(requested, 20);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(stock(&db, &p.id).await, 15);
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(db.sales().count_sale_logs().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_receive_many_lines_sums_deltas() {
        let (db, p) = setup().await;
        let q = db
            .products()
            .create("Q", None, Money::from_major(20), 0)
            .await
            .unwrap();

        let cmd = invoice(vec![
            receipt(&p.id, 3, 100, 150),
            receipt(&q.id, 7, 10, 20),
            receipt(&p.id, 2, 90, 150),
        ]);
        let created = db.ledger().receive_invoice(&cmd).await.unwrap();

        assert_eq!(created.total_amount(), cmd.total_amount());
        assert_eq!(stock(&db, &p.id).await, 15);
        assert_eq!(stock(&db, &q.id).await, 7);
        assert_eq!(db.invoices().count_stock_logs().await.unwrap(), 3);

        // Lines come back in submission order
        let fetched = db.invoices().get_by_id(&created.id).await.unwrap().unwrap();
        let order: Vec<i64> = fetched.items.iter().map(|l| l.amount).collect();
        assert_eq!(order, vec![3, 7, 2]);
        assert_eq!(fetched.items[1].product.title, "Q");
        assert_eq!(fetched.items[0].cost_price_minor, 10000);
    }

    #[tokio::test]
    async fn test_unknown_product_rolls_back_invoice() {
        let (db, p) = setup().await;

        let cmd = invoice(vec![
            receipt(&p.id, 5, 100, 150),
            receipt("missing", 1, 100, 150),
        ]);
        let err = db.ledger().receive_invoice(&cmd).await.unwrap_err();

        assert!(matches!(
            err,
            LedgerError::Core(CoreError::ProductNotFound(ref id)) if id == "missing"
        ));
        assert_eq!(stock(&db, &p.id).await, 10);
        assert_eq!(db.invoices().count().await.unwrap(), 0);
        assert_eq!(db.invoices().count_stock_logs().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sale_decrements_and_logs() {
        let (db, p) = setup().await;

        let recorded = db
            .ledger()
            .record_sale(&sale(vec![(p.id.as_str(), 4), (p.id.as_str(), 6)]))
            .await
            .unwrap();

        assert_eq!(recorded.items.len(), 2);
        assert_eq!(recorded.total().minor(), 150_000);
        assert_eq!(stock(&db, &p.id).await, 0);
        assert_eq!(db.sales().count_sale_logs().await.unwrap(), 2);

        let fetched = db.sales().get_by_id(&recorded.id).await.unwrap().unwrap();
        assert_eq!(fetched.sold_by, "cashier");
        assert_eq!(fetched.items[0].amount, 4);
        assert_eq!(fetched.items[1].amount, 6);
    }

    #[tokio::test]
    async fn test_later_short_line_undoes_earlier_lines() {
        let (db, p) = setup().await;
        let q = db
            .products()
            .create("Q", None, Money::from_major(20), 1)
            .await
            .unwrap();

        let err = db
            .ledger()
            .record_sale(&sale(vec![(p.id.as_str(), 3), (q.id.as_str(), 2)]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InsufficientStock { .. })
        ));
        assert_eq!(stock(&db, &p.id).await, 10);
        assert_eq!(stock(&db, &q.id).await, 1);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sale_of_unknown_product() {
        let (db, _) = setup().await;
        let err = db
            .ledger()
            .record_sale(&sale(vec![("ghost", 1)]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remainders_after_receive() {
        let (db, p) = setup().await;
        db.ledger()
            .receive_invoice(&invoice(vec![receipt(&p.id, 5, 100, 150)]))
            .await
            .unwrap();

        let rows = db.reports().remainders().await.unwrap();
        assert_eq!(
            rows,
            vec![Remainder {
                name: "P".to_string(),
                quantity: 15,
                price: "150.00".to_string(),
                total: "2250.00".to_string(),
            }]
        );
        assert_eq!(db.reports().stock_value().await.unwrap().to_string(), "2250.00");
    }

    #[tokio::test]
    async fn test_concurrent_sales_never_oversell() {
        let path = std::env::temp_dir().join(format!("depot-ledger-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(4))
            .await
            .unwrap();
        let p = db
            .products()
            .create("P", None, Money::from_major(150), 10)
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let ledger = db.ledger();
            let cmd = sale(vec![(p.id.as_str(), 3)]);
            handles.push(tokio::spawn(async move { ledger.record_sale(&cmd).await }));
        }

        let mut sold = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => sold += 1,
                Err(LedgerError::Core(CoreError::InsufficientStock { .. })) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(sold, 3);
        assert_eq!(stock(&db, &p.id).await, 1);
        assert_eq!(db.sales().count().await.unwrap(), 3);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }
}
