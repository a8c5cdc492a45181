//! Warehouse adapter for the pipeline's storage traits.
//!
//! The core crate speaks `Symbol`/`Date`; the warehouse speaks strings.
//! This adapter owns the conversion in both directions plus the per-batch
//! request id used for the ingest log.

use std::collections::HashMap;

use time::Date;
use uuid::Uuid;

use berza_core::parse::ISO_DATE;
use berza_core::{HistorySink, StoreError, Symbol, TradeRecord, WatermarkSource};
use berza_warehouse::{HistoryRecord, Warehouse};

pub struct WarehouseStore {
    warehouse: Warehouse,
}

impl WarehouseStore {
    pub fn new(warehouse: Warehouse) -> Self {
        Self { warehouse }
    }
}

impl WatermarkSource for WarehouseStore {
    fn latest_dates(&self, symbols: &[Symbol]) -> Result<HashMap<Symbol, Date>, StoreError> {
        let names: Vec<String> = symbols
            .iter()
            .map(|symbol| symbol.as_str().to_string())
            .collect();
        let stored = self
            .warehouse
            .latest_dates(&names)
            .map_err(|error| StoreError::new(error.to_string()))?;

        let mut watermarks = HashMap::new();
        for symbol in symbols {
            if let Some(date) = stored.get(symbol.as_str()) {
                let parsed = Date::parse(date, ISO_DATE).map_err(|error| {
                    StoreError::new(format!("stored date '{date}' for {symbol}: {error}"))
                })?;
                watermarks.insert(symbol.clone(), parsed);
            }
        }
        Ok(watermarks)
    }
}

impl HistorySink for WarehouseStore {
    fn insert_history(&self, records: &[TradeRecord]) -> Result<usize, StoreError> {
        let request_id = format!("history:{}", Uuid::new_v4());
        let rows = records
            .iter()
            .map(to_history_record)
            .collect::<Result<Vec<_>, _>>()?;
        self.warehouse
            .ingest_history(request_id.as_str(), &rows)
            .map_err(|error| StoreError::new(error.to_string()))
    }
}

fn to_history_record(record: &TradeRecord) -> Result<HistoryRecord, StoreError> {
    let date = record
        .date
        .format(ISO_DATE)
        .map_err(|error| StoreError::new(format!("date format for {}: {error}", record.symbol)))?;
    Ok(HistoryRecord {
        symbol: record.symbol.as_str().to_string(),
        date,
        last_price: record.last_price,
        max_price: record.max_price,
        min_price: record.min_price,
        avg_price: record.avg_price,
        percent_change: record.percent_change,
        volume: record.volume,
        turnover: record.turnover,
        total_turnover: record.total_turnover,
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use berza_warehouse::WarehouseConfig;

    use super::*;

    fn open_temp(temp: &tempfile::TempDir) -> WarehouseStore {
        let berza_home = temp.path().join("berza-home");
        let db_path = berza_home.join("history.duckdb");
        WarehouseStore::new(
            Warehouse::open(WarehouseConfig {
                berza_home,
                db_path,
                max_pool_size: 2,
            })
            .expect("warehouse open"),
        )
    }

    fn record(symbol: &Symbol, day: Date) -> TradeRecord {
        TradeRecord {
            symbol: symbol.clone(),
            date: day,
            last_price: 21_600.0,
            max_price: 21_700.0,
            min_price: 21_500.0,
            avg_price: 21_600.0,
            percent_change: 0.46,
            volume: 1234,
            turnover: 26_654_400.0,
            total_turnover: 26_654_400.0,
        }
    }

    #[test]
    fn inserted_records_become_the_watermark() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = open_temp(&temp);
        let kmb = Symbol::parse("KMB").expect("valid symbol");
        let alk = Symbol::parse("ALK").expect("valid symbol");

        let inserted = store
            .insert_history(&[
                record(&kmb, date!(2024 - 01 - 15)),
                record(&kmb, date!(2024 - 01 - 16)),
            ])
            .expect("insert");
        assert_eq!(inserted, 2);

        let watermarks = store
            .latest_dates(&[kmb.clone(), alk])
            .expect("latest dates");
        assert_eq!(watermarks.get(&kmb), Some(&date!(2024 - 01 - 16)));
        assert_eq!(watermarks.len(), 1);
    }
}
