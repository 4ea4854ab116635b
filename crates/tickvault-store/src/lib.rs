//! # Tickvault Store
//!
//! `DuckDB`-backed persistence for daily price entries.
//!
//! ## Overview
//!
//! One writer path and two reader paths share a pooled database file:
//!
//! | Operation | Behavior |
//! |-----------|----------|
//! | [`Store::upsert_entries`] | One transaction per batch; `INSERT OR REPLACE` keyed by `(symbol, date)` |
//! | [`Store::query`] | Inclusive date-range filter, date ascending, paginated |
//! | [`Store::statistics`] | Same filter, averages computed in Rust |
//!
//! The schema is created lazily by the first ingestion; reads against a
//! database that was never ingested into fail with a storage error.
//!
//! ## Security
//!
//! Every user-influenced value is bound as a query parameter. A symbol like
//! `"IBM'; DROP TABLE financial_data; --"` is stored and queried as an
//! ordinary key.
//!
//! ```rust,no_run
//! use tickvault_store::{QueryRequest, Store};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Store::open_default()?;
//!     let page = store.query(&QueryRequest {
//!         symbol: "IBM".into(),
//!         start_date: "2024-01-01".into(),
//!         end_date: "2024-01-31".into(),
//!         limit: Some(5),
//!         page: Some(1),
//!     })?;
//!     println!("{} matching rows", page.pagination.count);
//!     Ok(())
//! }
//! ```

pub mod duckdb;
pub mod migrations;
pub mod query;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::{Connection, ToSql};
use serde::Serialize;
use thiserror::Error;
use tickvault_core::{DataEntry, ValidationError};

pub use duckdb::{AccessMode, DuckDbConnectionManager, PooledConnection};
pub use query::{
    Page, Pagination, QueryError, QueryRequest, Statistics, StatisticsRequest,
};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (file system operations).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A stored value no longer passes domain validation. Points at
    /// external modification of the database file.
    #[error("stored row failed validation: {0}")]
    MalformedRow(#[from] ValidationError),
}

/// Configuration for the store database.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root directory for tickvault data.
    pub tickvault_home: PathBuf,
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Maximum number of idle connections kept per access mode.
    pub max_pool_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let tickvault_home = resolve_tickvault_home();
        let db_path = tickvault_home.join("financial.duckdb");
        Self {
            tickvault_home,
            db_path,
            max_pool_size: 4,
        }
    }
}

/// Outcome of one upsert batch.
///
/// `inserted + updated` always equals the batch length: every entry lands
/// as exactly one fresh row or one replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpsertReport {
    pub inserted: u64,
    pub updated: u64,
}

/// Handle to the storage layer. Cheap to clone; an explicit value passed to
/// whatever needs it, never global state.
#[derive(Clone)]
pub struct Store {
    config: StoreConfig,
    manager: DuckDbConnectionManager,
}

impl Store {
    /// Open a store with default configuration.
    pub fn open_default() -> Result<Self, StorageError> {
        Self::open(StoreConfig::default())
    }

    /// Open a store with the specified configuration.
    ///
    /// Creates the parent directory of the database file but no schema:
    /// tables appear when the first batch is ingested.
    pub fn open(config: StoreConfig) -> Result<Self, StorageError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = DuckDbConnectionManager::new(config.db_path.clone(), config.max_pool_size);
        Ok(Self { config, manager })
    }

    /// Get the path to the database file.
    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    /// The configuration this store was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Apply one batch of entries, all inside a single transaction.
    ///
    /// Pending migrations run first, so the table exists by the time the
    /// batch starts. Each entry becomes one parameterized
    /// `INSERT OR REPLACE`: an absent `(symbol, date)` key inserts, a
    /// present one replaces prices and volume in place. Any failure rolls
    /// the whole batch back; readers only ever observe the pre-batch or
    /// post-batch state.
    ///
    /// One `ingest_log` row is recorded per batch under `run_id`.
    pub fn upsert_entries(
        &self,
        run_id: &str,
        entries: &[DataEntry],
    ) -> Result<UpsertReport, StorageError> {
        let connection = self.manager.acquire(AccessMode::ReadWrite)?;
        migrations::apply_migrations(&connection)?;

        if entries.is_empty() {
            return Ok(UpsertReport {
                inserted: 0,
                updated: 0,
            });
        }

        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<UpsertReport, StorageError> {
            let rows_before = count_rows(&connection)?;

            for entry in entries {
                let symbol = entry.symbol.as_str();
                let date = entry.date.format_iso();
                let params: [&dyn ToSql; 5] = [
                    &symbol,
                    &date,
                    &entry.open_price,
                    &entry.close_price,
                    &entry.volume,
                ];
                connection.execute(
                    "INSERT OR REPLACE INTO financial_data \
                     (symbol, date, open_price, close_price, volume) \
                     VALUES (?, ?, ?, ?, ?)",
                    params.as_slice(),
                )?;
            }

            let rows_after = count_rows(&connection)?;
            let inserted = rows_after.saturating_sub(rows_before);
            let report = UpsertReport {
                inserted,
                updated: entries.len() as u64 - inserted,
            };

            let entry_count = entries.len() as u64;
            let log_params: [&dyn ToSql; 4] =
                [&run_id, &entry_count, &report.inserted, &report.updated];
            connection.execute(
                "INSERT INTO ingest_log (run_id, entry_count, inserted, updated) \
                 VALUES (?, ?, ?, ?)",
                log_params.as_slice(),
            )?;

            Ok(report)
        })();

        let report = finalize_transaction(&connection, result)?;
        tracing::debug!(
            run_id,
            inserted = report.inserted,
            updated = report.updated,
            "applied upsert batch"
        );
        Ok(report)
    }

    /// Run a paginated range query. See [`query::QueryRequest`].
    pub fn query(&self, request: &QueryRequest) -> Result<Page, QueryError> {
        query::run_query(&self.manager, request)
    }

    /// Compute range statistics. See [`query::StatisticsRequest`].
    pub fn statistics(&self, request: &StatisticsRequest) -> Result<Statistics, QueryError> {
        query::run_statistics(&self.manager, request)
    }
}

fn count_rows(connection: &Connection) -> Result<u64, StorageError> {
    let count: i64 =
        connection.query_row("SELECT COUNT(*) FROM financial_data", [], |row| row.get(0))?;
    Ok(u64::try_from(count).unwrap_or(0))
}

fn finalize_transaction<T>(
    connection: &Connection,
    result: Result<T, StorageError>,
) -> Result<T, StorageError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            tracing::warn!(error = %error, "rolling back upsert batch");
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}

fn resolve_tickvault_home() -> PathBuf {
    if let Some(path) = env::var_os("TICKVAULT_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".tickvault");
    }

    PathBuf::from(".tickvault")
}
