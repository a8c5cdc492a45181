use thiserror::Error;

use crate::domain::Symbol;

/// Domain validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("symbol length {len} exceeds maximum {max}")]
    SymbolTooLong { len: usize, max: usize },

    #[error("symbol contains non-alphabetic character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("date range start {start} is after end {end}")]
    InvertedDateRange { start: time::Date, end: time::Date },
}

/// Terminal failure of a windowed fetch.
///
/// Exhaustion is reported at symbol granularity: the worker abandons the
/// symbol's remaining windows and the next run's watermark retries the span.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("retries exhausted for {symbol} after {attempts} attempts")]
    ExhaustedRetries { symbol: Symbol, attempts: u32 },
}

/// Opaque persistence-layer failure surfaced through the store traits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("store error: {message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
