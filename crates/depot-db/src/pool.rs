//! # Database Handle
//!
//! Opens the ledger's SQLite file and hands out repositories.
//!
//! ## Locking
//! ```text
//! readers ─────────────► WAL snapshot, never wait on the writer
//!
//! add-invoice ─► BEGIN ─► INSERT header ─► holds the write lock ─► COMMIT
//! add-sale    ─► BEGIN ─► INSERT header ─► blocked ≤ busy_timeout ─┘
//!                                           └─ timeout ─► DbError::Busy
//! ```
//!
//! One writer at a time is a SQLite property. The ledger makes every batch
//! write first, so a competing batch queues on `busy_timeout` instead of
//! failing a read-to-write lock upgrade halfway through.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::ledger::StockLedger;
use crate::migrations;
use crate::repository::invoice::InvoiceRepository;
use crate::repository::product::ProductRepository;
use crate::repository::report::ReportRepository;
use crate::repository::sale::SaleRepository;

/// Where the ledger lives and how hard the pool may lean on it.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created on first open. `:memory:` for tests.
    pub database_path: PathBuf,

    /// Pool ceiling (default 5). Only one of these can write at a time.
    pub max_connections: u32,

    pub min_connections: u32,

    /// How long a request waits for a free pool connection.
    pub acquire_timeout: Duration,

    /// How long a batch waits for another batch's write lock before
    /// surfacing `DbError::Busy`.
    pub busy_timeout: Duration,

    /// Apply embedded migrations on open (default true).
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// A private in-memory ledger.
    ///
    /// Each SQLite connection to `:memory:` is its own database, so the pool
    /// is pinned to one connection that never idles out.
    pub fn in_memory() -> Self {
        DbConfig::new(":memory:")
            .max_connections(1)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(5))
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let url = format!("sqlite://{}?mode=rwc", self.database_path.display());

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // stock_logs and sale_logs reference products
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout)
            .create_if_missing(true);

        Ok(options)
    }
}

/// Shared handle to the ledger database.
///
/// Clones share one pool. Repositories are cheap views over it and are
/// created per call: `db.invoices().list(page)`, `db.ledger().record_sale(&cmd)`.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (or creates) the database and, unless disabled, migrates it.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let options = config.connect_options()?;

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout);
        if config.database_path.as_os_str() == ":memory:" {
            // Dropping the last connection would drop the database
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            busy_timeout_ms = config.busy_timeout.as_millis() as u64,
            "Ledger database opened"
        );

        let db = Database { pool };
        if config.run_migrations {
            migrations::run_migrations(&db.pool).await?;
        }
        Ok(db)
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Receiving history: invoices and their stock logs.
    pub fn invoices(&self) -> InvoiceRepository {
        InvoiceRepository::new(self.pool.clone())
    }

    /// Sale history: sales and their sale logs.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.pool.clone())
    }

    /// The only writer of `products.stock`.
    pub fn ledger(&self) -> StockLedger {
        StockLedger::new(self.pool.clone())
    }

    /// `(embedded, applied)` migration counts for `/health`.
    pub async fn migration_status(&self) -> DbResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }

    /// Waits for checked-out connections to return, then closes the pool.
    pub async fn close(&self) {
        info!("Closing ledger database");
        self.pool.close().await;
    }

    /// `SELECT 1` round trip. False once the pool is closed.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_migrations_applied() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (embedded, applied) = db.migration_status().await.unwrap();

        assert!(embedded >= 1);
        assert_eq!(embedded, applied);
    }

    #[tokio::test]
    async fn test_without_migrations() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();
        let (embedded, applied) = db.migration_status().await.unwrap();

        assert!(embedded >= 1);
        assert_eq!(applied, 0);
    }

    #[tokio::test]
    async fn test_close_fails_health_check() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/depot-test.db")
            .max_connections(10)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(3))
            .busy_timeout(Duration::from_secs(1))
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.acquire_timeout, Duration::from_secs(3));
        assert_eq!(config.busy_timeout, Duration::from_secs(1));
        assert!(!config.run_migrations);

        let memory = DbConfig::in_memory();
        assert_eq!(memory.max_connections, 1);
        assert!(memory.run_migrations);
    }
}
