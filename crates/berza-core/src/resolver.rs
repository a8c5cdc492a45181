//! Last-known-date resolution.
//!
//! The blocking preparation phase of a run: one batched watermark lookup
//! turns the symbol list into a complete task list before any concurrent
//! fetching starts. A symbol with stored history resumes from its stored
//! date itself — the one-day overlap at the boundary is absorbed by the
//! sink's `(symbol, date)` uniqueness — and a symbol with no history
//! defaults to ten years back.

use std::collections::HashMap;

use time::Date;
use tracing::debug;

use crate::domain::{FetchTask, Symbol};
use crate::error::StoreError;

/// Default horizon for symbols with no stored history.
pub const DEFAULT_LOOKBACK_YEARS: i32 = 10;

/// Batched read access to per-symbol watermarks.
pub trait WatermarkSource: Send + Sync {
    /// Most recent stored date per symbol, for every symbol that has data.
    /// Must answer the whole batch with one store round-trip.
    fn latest_dates(&self, symbols: &[Symbol]) -> Result<HashMap<Symbol, Date>, StoreError>;
}

/// Build one fetch task per symbol, bounded by `today`.
pub fn resolve(
    store: &dyn WatermarkSource,
    symbols: &[Symbol],
    today: Date,
) -> Result<Vec<FetchTask>, StoreError> {
    let watermarks = store.latest_dates(symbols)?;
    let default_start = years_back(today, DEFAULT_LOOKBACK_YEARS);
    debug!(
        symbols = symbols.len(),
        with_watermark = watermarks.len(),
        %default_start,
        "resolved fetch horizon"
    );

    Ok(symbols
        .iter()
        .map(|symbol| FetchTask {
            symbol: symbol.clone(),
            start: watermarks.get(symbol).copied().unwrap_or(default_start),
            end: today,
        })
        .collect())
}

/// Same calendar day `years` years earlier; Feb 29 clamps to Feb 28.
fn years_back(date: Date, years: i32) -> Date {
    let year = date.year() - years;
    Date::from_calendar_date(year, date.month(), date.day()).unwrap_or_else(|_| {
        Date::from_calendar_date(year, date.month(), 28).expect("day 28 exists in every month")
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::windows;

    struct FixedWatermarks(HashMap<Symbol, Date>);

    impl WatermarkSource for FixedWatermarks {
        fn latest_dates(&self, symbols: &[Symbol]) -> Result<HashMap<Symbol, Date>, StoreError> {
            Ok(symbols
                .iter()
                .filter_map(|symbol| {
                    self.0
                        .get(symbol)
                        .map(|date| (symbol.clone(), *date))
                })
                .collect())
        }
    }

    struct BrokenStore;

    impl WatermarkSource for BrokenStore {
        fn latest_dates(&self, _symbols: &[Symbol]) -> Result<HashMap<Symbol, Date>, StoreError> {
            Err(StoreError::new("store offline"))
        }
    }

    fn symbol(name: &str) -> Symbol {
        Symbol::parse(name).expect("valid symbol")
    }

    #[test]
    fn unknown_symbol_defaults_to_ten_years_back() {
        let store = FixedWatermarks(HashMap::new());
        let today = date!(2024 - 11 - 03);

        let tasks = resolve(&store, &[symbol("KMB")], today).expect("resolve succeeds");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].start, date!(2014 - 11 - 03));
        assert_eq!(tasks[0].end, today);
    }

    #[test]
    fn leap_day_clamps_to_february_28() {
        assert_eq!(
            years_back(date!(2024 - 02 - 29), 10),
            date!(2014 - 02 - 28)
        );
    }

    #[test]
    fn stored_watermark_becomes_the_start_bound() {
        let mut watermarks = HashMap::new();
        watermarks.insert(symbol("KMB"), date!(2024 - 01 - 01));
        let store = FixedWatermarks(watermarks);
        let today = date!(2024 - 02 - 01);

        let tasks = resolve(&store, &[symbol("KMB"), symbol("ALK")], today)
            .expect("resolve succeeds");
        assert_eq!(tasks[0].start, date!(2024 - 01 - 01));
        assert_eq!(tasks[1].start, date!(2014 - 02 - 01));

        // Resuming watermark produces exactly one window [2024-01-01, 2024-02-01].
        let plan = windows::plan(tasks[0].start, tasks[0].end);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].start, date!(2024 - 01 - 01));
        assert_eq!(plan[0].end, date!(2024 - 02 - 01));
    }

    #[test]
    fn store_failure_propagates() {
        let error = resolve(&BrokenStore, &[symbol("KMB")], date!(2024 - 01 - 01))
            .expect_err("must fail");
        assert!(error.to_string().contains("store offline"));
    }
}
