//! # Berza Core
//!
//! Fetch pipeline for incremental harvesting of daily trading history from
//! the Macedonian Stock Exchange public site.
//!
//! ## Overview
//!
//! The pipeline resumes per symbol from the most recent stored date, splits
//! the missing range into bounded windows, fetches them with bounded retry,
//! and parses the tabular responses into normalized trade records:
//!
//! ```text
//! symbols ──▶ resolver ──▶ FetchTask per symbol
//!                              │
//!                              ▼
//!                      FleetScheduler (×N workers, ≤10 connections)
//!                              │
//!                              ▼
//!                  windows ──▶ RetryingFetcher ──▶ parse
//!                              │
//!                              ▼
//!                      HistorySink (bulk insert per symbol)
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`domain`] | Domain models (Symbol, DateRange, TradeRecord, FetchTask) |
//! | [`error`] | Validation, fetch, and store error types |
//! | [`fetcher`] | Windowed HTTP fetch with bounded retry |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`parse`] | HTML table extraction and row normalization |
//! | [`resolver`] | Last-known-date resolution into fetch tasks |
//! | [`retry`] | Pure retry state machine |
//! | [`scheduler`] | Concurrent fan-out across symbols |
//! | [`symbols`] | Symbol catalog bootstrap (cached or remote) |
//! | [`throttling`] | Shared connection gate |
//! | [`windows`] | Date-range window planner |
//! | [`worker`] | Per-symbol fetch loop |

pub mod domain;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod parse;
pub mod resolver;
pub mod retry;
pub mod scheduler;
pub mod symbols;
pub mod throttling;
pub mod windows;
pub mod worker;

// Re-export commonly used types at crate root for convenience

pub use domain::{DateRange, FetchTask, Symbol, TradeRecord};
pub use error::{FetchError, StoreError, ValidationError};
pub use fetcher::{RetryingFetcher, DEFAULT_BASE_URL};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use resolver::{resolve, WatermarkSource, DEFAULT_LOOKBACK_YEARS};
pub use retry::{AttemptOutcome, RetryPolicy, RetryState};
pub use scheduler::{FleetScheduler, HistorySink, SymbolReport};
pub use symbols::{SymbolSource, DEFAULT_CATALOG_URL};
pub use throttling::{ConnectionGate, MAX_HOST_CONNECTIONS};
pub use worker::{run_symbol, SymbolOutcome};
