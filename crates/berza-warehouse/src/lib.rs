//! DuckDB-backed storage for harvested price history.
//!
//! One table, `price_history`, keyed by `(symbol, date)`: re-fetching an
//! overlapping window replaces rows instead of duplicating them, which is
//! what lets the resolver hand out start dates that overlap the stored
//! watermark by one day. `ingest_log` records one row per persisted batch
//! for post-run inspection.

pub mod duckdb;
pub mod migrations;

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::ToSql;
use thiserror::Error;
use tracing::debug;

pub use duckdb::{DuckDbConnectionManager, PooledConnection};

use migrations::escape_sql_string;

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    pub berza_home: PathBuf,
    pub db_path: PathBuf,
    pub max_pool_size: usize,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        let berza_home = resolve_berza_home();
        let db_path = berza_home.join("history.duckdb");
        Self {
            berza_home,
            db_path,
            max_pool_size: 4,
        }
    }
}

/// One trading day ready for insertion. Dates are ISO `YYYY-MM-DD` strings;
/// DuckDB casts them to `DATE` on the way in.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub symbol: String,
    pub date: String,
    pub last_price: f64,
    pub max_price: f64,
    pub min_price: f64,
    pub avg_price: f64,
    pub percent_change: f64,
    pub volume: u64,
    pub turnover: f64,
    pub total_turnover: f64,
}

#[derive(Clone)]
pub struct Warehouse {
    manager: DuckDbConnectionManager,
}

impl Warehouse {
    pub fn open_default() -> Result<Self, WarehouseError> {
        Self::open(WarehouseConfig::default())
    }

    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = DuckDbConnectionManager::new(config.db_path.clone(), config.max_pool_size);
        let warehouse = Self { manager };
        warehouse.initialize()?;
        Ok(warehouse)
    }

    pub fn initialize(&self) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire()?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    /// Most recent stored date per symbol, as ISO strings. Symbols with no
    /// stored rows are absent from the map. One query for the whole batch.
    pub fn latest_dates(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, String>, WarehouseError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = vec!["?"; symbols.len()].join(", ");
        let sql = format!(
            "SELECT symbol, CAST(MAX(date) AS VARCHAR) FROM price_history \
             WHERE symbol IN ({placeholders}) GROUP BY symbol"
        );

        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(sql.as_str())?;
        let params: Vec<&dyn ToSql> = symbols.iter().map(|symbol| symbol as &dyn ToSql).collect();
        let mut rows = statement.query(params.as_slice())?;

        let mut watermarks = HashMap::new();
        while let Some(row) = rows.next()? {
            let symbol: String = row.get(0)?;
            let date: String = row.get(1)?;
            watermarks.insert(symbol, date);
        }

        debug!(
            symbols = symbols.len(),
            with_history = watermarks.len(),
            "resolved stored watermarks"
        );
        Ok(watermarks)
    }

    /// Insert one symbol's batch inside a single transaction; overlapping
    /// `(symbol, date)` rows are replaced. Returns the number of rows written.
    pub fn ingest_history(
        &self,
        request_id: &str,
        rows: &[HistoryRecord],
    ) -> Result<usize, WarehouseError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<usize, WarehouseError> {
            for row in rows {
                let sql = format!(
                    r#"
INSERT OR REPLACE INTO price_history (
    symbol, date, last_price, max_price, min_price, avg_price,
    percent_change, volume, turnover, total_turnover, updated_at
) VALUES (
    '{symbol}', CAST('{date}' AS DATE), {last_price}, {max_price}, {min_price}, {avg_price},
    {percent_change}, {volume}, {turnover}, {total_turnover}, CURRENT_TIMESTAMP
);
"#,
                    symbol = escape_sql_string(row.symbol.as_str()),
                    date = escape_sql_string(row.date.as_str()),
                    last_price = row.last_price,
                    max_price = row.max_price,
                    min_price = row.min_price,
                    avg_price = row.avg_price,
                    percent_change = row.percent_change,
                    volume = row.volume,
                    turnover = row.turnover,
                    total_turnover = row.total_turnover,
                );
                connection.execute_batch(sql.as_str())?;
            }

            let log = format!(
                "INSERT INTO ingest_log (request_id, symbol, rows, status, timestamp) \
                 VALUES ('{request_id}', '{symbol}', {rows}, 'ok', CURRENT_TIMESTAMP)",
                request_id = escape_sql_string(request_id),
                symbol = escape_sql_string(rows[0].symbol.as_str()),
                rows = rows.len(),
            );
            connection.execute_batch(log.as_str())?;

            Ok(rows.len())
        })();

        finalize_transaction(&connection, result)
    }
}

fn finalize_transaction<T>(
    connection: &::duckdb::Connection,
    result: Result<T, WarehouseError>,
) -> Result<T, WarehouseError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}

fn resolve_berza_home() -> PathBuf {
    if let Some(path) = env::var_os("BERZA_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".berza");
    }

    PathBuf::from(".berza")
}
