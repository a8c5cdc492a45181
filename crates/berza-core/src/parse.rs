//! HTML table extraction and price-row normalization.
//!
//! The history endpoint returns an HTML document with a single data table.
//! Each `<tbody>` row carries nine cells: date, last/max/min/avg price,
//! percent change, volume, turnover, and total turnover. Numeric cells mix
//! thousands separators and decimal points inconsistently, so parsing is
//! deliberately forgiving: a malformed numeric cell degrades to zero rather
//! than rejecting the row.

use scraper::{Html, Selector};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;
use tracing::debug;

use crate::domain::{Symbol, TradeRecord};

/// Fixed column count of the upstream history table.
pub const HISTORY_COLUMNS: usize = 9;

/// Date layout used by the source site (`MM/DD/YYYY`).
pub const SOURCE_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[month]/[day]/[year]");

/// ISO calendar layout used at the persistence boundary (`YYYY-MM-DD`).
pub const ISO_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Pull the text cells of every `<tbody>` table row out of a response page.
///
/// A document without a table body means zero rows for the window, not an
/// error. Rows without `<td>` cells (header or filler rows) are skipped.
pub fn extract_rows(html: &str) -> Vec<Vec<String>> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("tbody tr").expect("static selector is valid");
    let cell_selector = Selector::parse("td").expect("static selector is valid");

    document
        .select(&row_selector)
        .filter_map(|row| {
            let cells: Vec<String> = row
                .select(&cell_selector)
                .map(|cell| cell.text().collect::<String>().trim().to_string())
                .collect();
            (!cells.is_empty()).then_some(cells)
        })
        .collect()
}

/// Convert one raw table row into a normalized record, or reject it.
///
/// Rejection is not an error: zero-volume rows are non-trading days, and
/// rows with the wrong arity or an unparseable date carry no usable data.
pub fn parse_row(symbol: &Symbol, cells: &[String]) -> Option<TradeRecord> {
    if cells.len() != HISTORY_COLUMNS {
        debug!(symbol = %symbol, arity = cells.len(), "skipping row with unexpected cell count");
        return None;
    }

    let date = match Date::parse(cells[0].as_str(), SOURCE_DATE) {
        Ok(date) => date,
        Err(_) => {
            debug!(symbol = %symbol, cell = %cells[0], "skipping row with unparseable date");
            return None;
        }
    };

    let volume = parse_volume(cells[6].as_str());
    if volume == 0 {
        return None;
    }

    Some(TradeRecord {
        symbol: symbol.clone(),
        date,
        last_price: parse_decimal(cells[1].as_str()),
        max_price: parse_decimal(cells[2].as_str()),
        min_price: parse_decimal(cells[3].as_str()),
        avg_price: parse_decimal(cells[4].as_str()),
        percent_change: parse_decimal(cells[5].as_str()),
        volume,
        turnover: parse_decimal(cells[7].as_str()),
        total_turnover: parse_decimal(cells[8].as_str()),
    })
}

/// Parse a locale-formatted decimal cell.
///
/// Strips `,` grouping separators, collapses multiple `.` down to the last
/// one, and substitutes `0.0` when the remainder still fails to parse.
pub fn parse_decimal(cell: &str) -> f64 {
    let stripped: String = cell.trim().chars().filter(|&ch| ch != ',').collect();
    let Some(last_dot) = stripped.rfind('.') else {
        return stripped.parse().unwrap_or(0.0);
    };

    let mut normalized = String::with_capacity(stripped.len());
    for (index, ch) in stripped.char_indices() {
        if ch == '.' && index != last_dot {
            continue;
        }
        normalized.push(ch);
    }
    normalized.parse().unwrap_or(0.0)
}

/// Parse a volume cell: grouping separators stripped, empty treated as zero.
pub fn parse_volume(cell: &str) -> u64 {
    let stripped: String = cell.trim().chars().filter(|&ch| ch != ',').collect();
    if stripped.is_empty() {
        return 0;
    }
    stripped.parse().unwrap_or(0)
}
