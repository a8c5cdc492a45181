//! Symbol catalog bootstrap.
//!
//! The catalog lives on one fixed page as a `<select>` of `<option>`
//! entries; fetching it once per deployment is enough, so the loaded list
//! is cached to a flat line-delimited file. The caller decides which
//! variant to use — no implicit file-existence checks inside the fetch
//! logic. Every bootstrap failure degrades to an empty symbol set: the run
//! then proceeds with nothing to do instead of aborting.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::domain::Symbol;
use crate::http_client::{HttpClient, HttpRequest};

/// Catalog page carrying the symbol `<select>` element.
pub const DEFAULT_CATALOG_URL: &str = "https://www.mse.mk/en/stats/symbolhistory/KMB";

const CATALOG_TIMEOUT_MS: u64 = 10_000;

/// Where the run's symbol list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolSource {
    /// Previously cached line-delimited list.
    Cached { path: PathBuf },
    /// Live catalog page; the result is written to `cache_path` when set.
    Remote {
        url: String,
        cache_path: Option<PathBuf>,
    },
}

impl SymbolSource {
    /// Load the symbol list, degrading to empty on any failure.
    pub async fn load(&self, client: &Arc<dyn HttpClient>) -> Vec<Symbol> {
        match self {
            Self::Cached { path } => load_cached(path.as_path()),
            Self::Remote { url, cache_path } => {
                fetch_catalog(client, url.as_str(), cache_path.as_deref()).await
            }
        }
    }
}

/// True when the cache file exists and holds at least one line.
pub fn cache_is_populated(path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|content| content.lines().any(|line| !line.trim().is_empty()))
        .unwrap_or(false)
}

fn load_cached(path: &Path) -> Vec<Symbol> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let symbols = parse_symbol_lines(content.as_str());
            info!(path = %path.display(), count = symbols.len(), "loaded cached symbol list");
            symbols
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "failed to read symbol cache");
            Vec::new()
        }
    }
}

async fn fetch_catalog(
    client: &Arc<dyn HttpClient>,
    url: &str,
    cache_path: Option<&Path>,
) -> Vec<Symbol> {
    let request = HttpRequest::get(url).with_timeout_ms(CATALOG_TIMEOUT_MS);
    let response = match client.execute(request).await {
        Ok(response) if response.is_success() => response,
        Ok(response) => {
            warn!(url, status = response.status, "symbol catalog fetch failed");
            return Vec::new();
        }
        Err(error) => {
            warn!(url, %error, "symbol catalog unreachable");
            return Vec::new();
        }
    };

    let symbols = extract_options(response.body.as_str());
    info!(url, count = symbols.len(), "fetched symbol catalog");

    if let Some(path) = cache_path {
        let lines: Vec<&str> = symbols.iter().map(Symbol::as_str).collect();
        if let Err(error) = fs::write(path, lines.join("\n")) {
            warn!(path = %path.display(), %error, "failed to write symbol cache");
        }
    }

    symbols
}

/// Keep only catalog entries that validate as harvest symbols; bonds and
/// numbered issues fail `Symbol::parse` and drop out here.
fn extract_options(html: &str) -> Vec<Symbol> {
    let document = Html::parse_document(html);
    let option_selector = Selector::parse("option").expect("static selector is valid");
    document
        .select(&option_selector)
        .filter_map(|option| {
            let text = option.text().collect::<String>();
            Symbol::parse(text.as_str()).ok()
        })
        .collect()
}

fn parse_symbol_lines(content: &str) -> Vec<Symbol> {
    content
        .lines()
        .filter_map(|line| Symbol::parse(line).ok())
        .collect()
}
