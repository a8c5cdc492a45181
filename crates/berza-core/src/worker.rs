//! Per-symbol fetch loop.
//!
//! Windows within one symbol are fetched strictly sequentially and in
//! chronological order: serializing them bounds load on the host and keeps
//! the abort semantics simple. Exhausted retries on any window abandon the
//! symbol's remaining windows for this run — already-fetched records are
//! kept, and the next run's watermark covers the missed span.

use tracing::{debug, warn};

use crate::domain::{FetchTask, Symbol, TradeRecord};
use crate::error::FetchError;
use crate::fetcher::RetryingFetcher;
use crate::{parse, windows};

/// Terminal state of one symbol's run.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolOutcome {
    pub symbol: Symbol,
    pub records: Vec<TradeRecord>,
    /// True when retries were exhausted before the plan completed.
    pub aborted: bool,
}

/// Fetch and parse every planned window for one task.
pub async fn run_symbol(fetcher: &RetryingFetcher, task: &FetchTask) -> SymbolOutcome {
    let plan = windows::plan(task.start, task.end);
    debug!(symbol = %task.symbol, windows = plan.len(), "starting symbol fetch");

    let mut records = Vec::new();
    let mut aborted = false;
    for window in &plan {
        match fetcher.fetch_window(&task.symbol, window).await {
            Ok(body) => {
                for cells in parse::extract_rows(body.as_str()) {
                    if let Some(record) = parse::parse_row(&task.symbol, &cells) {
                        records.push(record);
                    }
                }
            }
            Err(FetchError::ExhaustedRetries { attempts, .. }) => {
                warn!(
                    symbol = %task.symbol,
                    window = %window,
                    attempts,
                    collected = records.len(),
                    "abandoning remaining windows after exhausted retries"
                );
                aborted = true;
                break;
            }
        }
    }

    SymbolOutcome {
        symbol: task.symbol.clone(),
        records,
        aborted,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use time::macros::date;

    use super::*;
    use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};
    use crate::retry::RetryPolicy;
    use crate::throttling::ConnectionGate;

    fn page(rows: &[(&str, &str)]) -> String {
        let body: String = rows
            .iter()
            .map(|(day, volume)| {
                format!(
                    "<tr><td>{day}</td><td>100.0</td><td>101.0</td><td>99.0</td>\
                     <td>100.0</td><td>0.5</td><td>{volume}</td><td>1000</td><td>5000</td></tr>"
                )
            })
            .collect();
        format!("<html><body><table><tbody>{body}</tbody></table></body></html>")
    }

    struct ScriptedClient {
        script: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
        request_count: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(script: Vec<Result<HttpResponse, HttpError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                request_count: AtomicUsize::new(0),
            }
        }
    }

    impl HttpClient for ScriptedClient {
        fn execute<'a>(
            &'a self,
            _request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            Box::pin(async move {
                self.request_count.fetch_add(1, Ordering::SeqCst);
                self.script
                    .lock()
                    .expect("script lock")
                    .pop_front()
                    .unwrap_or_else(|| Err(HttpError::new("script exhausted")))
            })
        }
    }

    fn fetcher(client: Arc<ScriptedClient>) -> RetryingFetcher {
        RetryingFetcher::new(client, ConnectionGate::new(10)).with_policy(RetryPolicy {
            max_attempts: 5,
            backoff: Duration::from_millis(1),
        })
    }

    /// Three planned windows; window 2 exhausts retries. Only window 1's
    /// records come back and window 3 is never requested.
    #[tokio::test]
    async fn abort_keeps_earlier_windows_and_skips_later_ones() {
        let failures: Vec<Result<HttpResponse, HttpError>> =
            (0..5).map(|_| Ok(HttpResponse::with_status(503))).collect();
        let mut script = vec![Ok(HttpResponse::ok(page(&[
            ("01/15/2022", "10"),
            ("01/16/2022", "0"),
        ])))];
        script.extend(failures);
        // A would-be window 3 response that must never be consumed.
        script.push(Ok(HttpResponse::ok(page(&[("06/01/2024", "7")]))));

        let client = Arc::new(ScriptedClient::new(script));
        let task = FetchTask {
            symbol: Symbol::parse("KMB").expect("valid symbol"),
            start: date!(2022 - 01 - 01),
            // Spans three windows of at most 365 days each.
            end: date!(2024 - 06 - 30),
        };

        let outcome = run_symbol(&fetcher(Arc::clone(&client)), &task).await;

        assert!(outcome.aborted);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].date, date!(2022 - 01 - 15));
        // 1 success for window 1 + 5 spent attempts for window 2, nothing more.
        assert_eq!(client.request_count.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn up_to_date_task_fetches_nothing() {
        let client = Arc::new(ScriptedClient::new(Vec::new()));
        let task = FetchTask {
            symbol: Symbol::parse("ALK").expect("valid symbol"),
            start: date!(2024 - 06 - 30),
            end: date!(2024 - 06 - 30),
        };

        let outcome = run_symbol(&fetcher(Arc::clone(&client)), &task).await;

        assert!(!outcome.aborted);
        assert!(outcome.records.is_empty());
        assert_eq!(client.request_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_volume_rows_are_filtered_out() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(HttpResponse::ok(page(&[
            ("01/15/2024", "10"),
            ("01/16/2024", "0"),
            ("01/17/2024", "3"),
        ])))]));
        let task = FetchTask {
            symbol: Symbol::parse("TEL").expect("valid symbol"),
            start: date!(2024 - 01 - 01),
            end: date!(2024 - 02 - 01),
        };

        let outcome = run_symbol(&fetcher(client), &task).await;
        let dates: Vec<_> = outcome.records.iter().map(|record| record.date).collect();
        assert_eq!(dates, vec![date!(2024 - 01 - 15), date!(2024 - 01 - 17)]);
    }
}
