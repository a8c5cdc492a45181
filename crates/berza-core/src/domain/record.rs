use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::Symbol;

/// One normalized trading day for one symbol.
///
/// Produced by the row parser from a 9-column table row; immutable once
/// built. Invariant: `volume > 0` — zero-volume rows are non-trading days
/// and are never emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: Symbol,
    pub date: Date,
    pub last_price: f64,
    pub max_price: f64,
    pub min_price: f64,
    pub avg_price: f64,
    pub percent_change: f64,
    pub volume: u64,
    pub turnover: f64,
    pub total_turnover: f64,
}

/// Unit of work handed to the fleet scheduler: one symbol and the date
/// span it still needs. Created once per symbol per run by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTask {
    pub symbol: Symbol,
    pub start: Date,
    pub end: Date,
}
