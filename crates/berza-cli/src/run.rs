//! One end-to-end harvest run.
//!
//! Open the warehouse, load the symbol list, resolve per-symbol start
//! dates from stored watermarks, then fan the fetch out over the runtime
//! and print a one-line summary.

use std::sync::Arc;
use std::time::Instant;

use time::OffsetDateTime;
use tracing::{info, warn};

use berza_core::symbols::{cache_is_populated, SymbolSource};
use berza_core::{
    resolve, ConnectionGate, FleetScheduler, HistorySink, HttpClient, ReqwestHttpClient,
    RetryingFetcher, Symbol, MAX_HOST_CONNECTIONS,
};
use berza_warehouse::{Warehouse, WarehouseConfig};

use crate::cli::Cli;
use crate::error::CliError;
use crate::store::WarehouseStore;

pub async fn run(cli: Cli) -> Result<(), CliError> {
    let started = Instant::now();

    let warehouse = match cli.db_path.clone() {
        Some(db_path) => Warehouse::open(WarehouseConfig {
            db_path,
            ..WarehouseConfig::default()
        })?,
        None => Warehouse::open_default()?,
    };
    info!(db = %warehouse.db_path().display(), "warehouse ready");

    let client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let symbols = load_symbols(&cli, &client).await?;
    if symbols.is_empty() {
        warn!("no symbols to harvest");
        println!("nothing to do: symbol list is empty");
        return Ok(());
    }

    let store = Arc::new(WarehouseStore::new(warehouse));
    let today = OffsetDateTime::now_utc().date();
    let tasks = {
        // The watermark lookup is synchronous DuckDB work.
        let store = Arc::clone(&store);
        let symbols = symbols.clone();
        tokio::task::spawn_blocking(move || resolve(store.as_ref(), &symbols, today))
            .await
            .map_err(|error| CliError::Command(format!("watermark lookup failed: {error}")))??
    };

    let fetcher = Arc::new(
        RetryingFetcher::new(
            Arc::clone(&client),
            ConnectionGate::new(MAX_HOST_CONNECTIONS),
        )
        .with_base_url(cli.base_url.as_str()),
    );
    let scheduler = FleetScheduler::new(fetcher, store as Arc<dyn HistorySink>);
    let reports = scheduler.run(tasks).await;

    let fetched: usize = reports.iter().map(|report| report.fetched).sum();
    let inserted: usize = reports.iter().map(|report| report.inserted).sum();
    let aborted = reports.iter().filter(|report| report.aborted).count();
    let insert_failures = reports
        .iter()
        .filter(|report| report.insert_error.is_some())
        .count();
    let elapsed = started.elapsed();

    info!(
        symbols = reports.len(),
        fetched,
        inserted,
        aborted,
        insert_failures,
        elapsed_ms = elapsed.as_millis() as u64,
        "harvest complete"
    );
    println!(
        "harvested {} symbols in {:.1}s: {fetched} rows fetched, {inserted} rows inserted, \
         {aborted} aborted, {insert_failures} insert failures",
        reports.len(),
        elapsed.as_secs_f64(),
    );
    Ok(())
}

/// Explicit `--symbol` flags win; otherwise use the cache when populated
/// and fall back to the live catalog.
async fn load_symbols(cli: &Cli, client: &Arc<dyn HttpClient>) -> Result<Vec<Symbol>, CliError> {
    if !cli.symbols.is_empty() {
        return cli
            .symbols
            .iter()
            .map(|name| Symbol::parse(name).map_err(CliError::from))
            .collect();
    }

    let source = if !cli.refresh_symbols && cache_is_populated(cli.cache_file.as_path()) {
        SymbolSource::Cached {
            path: cli.cache_file.clone(),
        }
    } else {
        SymbolSource::Remote {
            url: cli.catalog_url.clone(),
            cache_path: Some(cli.cache_file.clone()),
        }
    };
    Ok(source.load(client).await)
}
