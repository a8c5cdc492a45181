//! Concurrent fan-out of symbol workers.
//!
//! All symbols run as logically concurrent tokio tasks; the transport-level
//! connection gate bounds actual parallelism to the host. Every worker runs
//! to a terminal state — one symbol's failure never cancels its siblings —
//! and each completed batch is handed to the persistence sink independently,
//! so a later symbol's failure cannot lose an earlier symbol's data.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{error, info};

use crate::domain::{FetchTask, Symbol, TradeRecord};
use crate::error::StoreError;
use crate::fetcher::RetryingFetcher;
use crate::worker::{self, SymbolOutcome};

/// Persistence sink for parsed history batches.
///
/// Implementations must tolerate concurrent calls: batches are keyed by
/// `(symbol, date)` and inserts are additive.
pub trait HistorySink: Send + Sync {
    /// Bulk-insert one symbol's batch; returns the number of rows written.
    fn insert_history(&self, records: &[TradeRecord]) -> Result<usize, StoreError>;
}

/// Terminal per-symbol result of one scheduled run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolReport {
    pub symbol: Symbol,
    pub fetched: usize,
    pub inserted: usize,
    /// True when the worker abandoned remaining windows after exhausted
    /// retries.
    pub aborted: bool,
    pub insert_error: Option<String>,
}

/// Fans symbol workers out over the runtime and collects their reports.
pub struct FleetScheduler {
    fetcher: Arc<RetryingFetcher>,
    sink: Arc<dyn HistorySink>,
}

impl FleetScheduler {
    pub fn new(fetcher: Arc<RetryingFetcher>, sink: Arc<dyn HistorySink>) -> Self {
        Self { fetcher, sink }
    }

    /// Run every task to a terminal state and report per symbol.
    ///
    /// Completion order across symbols is arbitrary; the returned reports
    /// follow it.
    pub async fn run(&self, tasks: Vec<FetchTask>) -> Vec<SymbolReport> {
        let mut workers = JoinSet::new();
        for task in tasks {
            let fetcher = Arc::clone(&self.fetcher);
            let sink = Arc::clone(&self.sink);
            workers.spawn(async move {
                let outcome = worker::run_symbol(fetcher.as_ref(), &task).await;
                finish_symbol(outcome, sink).await
            });
        }

        let mut reports = Vec::new();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(join_error) => error!(%join_error, "symbol worker panicked"),
            }
        }
        reports
    }
}

/// Persist one completed symbol's batch and build its report.
async fn finish_symbol(outcome: SymbolOutcome, sink: Arc<dyn HistorySink>) -> SymbolReport {
    let SymbolOutcome {
        symbol,
        records,
        aborted,
    } = outcome;
    let fetched = records.len();

    let mut inserted = 0;
    let mut insert_error = None;
    if !records.is_empty() {
        // The sink is synchronous; keep it off the fetch executor.
        let blocking_sink = Arc::clone(&sink);
        match tokio::task::spawn_blocking(move || blocking_sink.insert_history(&records)).await {
            Ok(Ok(count)) => inserted = count,
            Ok(Err(store_error)) => {
                error!(symbol = %symbol, error = %store_error, "bulk insert failed");
                insert_error = Some(store_error.to_string());
            }
            Err(join_error) => {
                error!(symbol = %symbol, %join_error, "insert task panicked");
                insert_error = Some(join_error.to_string());
            }
        }
    }

    info!(symbol = %symbol, fetched, inserted, aborted, "symbol run complete");
    SymbolReport {
        symbol,
        fetched,
        inserted,
        aborted,
        insert_error,
    }
}
