//! CLI argument definitions for the harvester.
//!
//! One command, one job: bring the local warehouse up to date with the
//! exchange. Every run is incremental — symbols resume from their stored
//! watermark, new symbols start ten years back.
//!
//! # Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--db-path` | `~/.berza/history.duckdb` | DuckDB database file |
//! | `--cache-file` | `valid_symbols.txt` | Symbol list cache |
//! | `--refresh-symbols` | `false` | Re-fetch the catalog even when cached |
//! | `--symbol` | | Harvest only the named symbols (repeatable) |
//! | `--base-url` | exchange history endpoint | History page base URL |
//! | `--catalog-url` | exchange catalog page | Symbol catalog URL |

use std::path::PathBuf;

use clap::Parser;

use berza_core::{DEFAULT_BASE_URL, DEFAULT_CATALOG_URL};

/// Incremental stock history harvester backed by a local DuckDB warehouse.
#[derive(Debug, Parser)]
#[command(name = "berza", version, about = "Incremental stock history harvester")]
pub struct Cli {
    /// DuckDB database file; defaults to `$BERZA_HOME/history.duckdb`.
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Line-delimited symbol list cache.
    #[arg(long, default_value = "valid_symbols.txt")]
    pub cache_file: PathBuf,

    /// Re-fetch the symbol catalog even when the cache is populated.
    #[arg(long)]
    pub refresh_symbols: bool,

    /// Harvest only these symbols instead of the catalog (repeatable).
    #[arg(long = "symbol")]
    pub symbols: Vec<String>,

    /// Base URL of the per-symbol history page.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// URL of the catalog page carrying the symbol list.
    #[arg(long, default_value = DEFAULT_CATALOG_URL)]
    pub catalog_url: String,
}
