//! Windowed HTTP fetch with bounded retry.
//!
//! One [`RetryingFetcher::fetch_window`] call issues
//! `GET {base_url}/{symbol}?FromDate=MM/DD/YYYY&ToDate=MM/DD/YYYY` and
//! drives the retry state machine until the page body arrives or the
//! attempt budget is spent. HTTP 503 is the distinguished overload
//! condition; any other response or transport failure retries the same
//! window with the same fixed backoff.

use std::sync::Arc;

use tracing::warn;

use crate::domain::{DateRange, Symbol};
use crate::error::FetchError;
use crate::http_client::{HttpClient, HttpRequest};
use crate::parse::SOURCE_DATE;
use crate::retry::{AttemptOutcome, RetryPolicy, RetryState};
use crate::throttling::ConnectionGate;

/// Production history endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.mse.mk/en/stats/symbolhistory";

const STATUS_SERVICE_UNAVAILABLE: u16 = 503;

/// Performs one windowed request per call, retrying transient failures.
pub struct RetryingFetcher {
    client: Arc<dyn HttpClient>,
    gate: ConnectionGate,
    policy: RetryPolicy,
    base_url: String,
}

impl RetryingFetcher {
    pub fn new(client: Arc<dyn HttpClient>, gate: ConnectionGate) -> Self {
        Self {
            client,
            gate,
            policy: RetryPolicy::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn window_url(&self, symbol: &Symbol, range: &DateRange) -> String {
        // SOURCE_DATE is a static layout; formatting a valid Date cannot fail.
        let from = range.start.format(SOURCE_DATE).unwrap_or_default();
        let to = range.end.format(SOURCE_DATE).unwrap_or_default();
        format!(
            "{}/{}?FromDate={}&ToDate={}",
            self.base_url,
            symbol,
            urlencoding::encode(from.as_str()),
            urlencoding::encode(to.as_str()),
        )
    }

    /// Fetch one window's page body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ExhaustedRetries`] once the policy's attempt
    /// budget is spent. Retry state is per window and does not carry over.
    pub async fn fetch_window(
        &self,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<String, FetchError> {
        let url = self.window_url(symbol, range);
        let mut state = self.policy.initial();

        loop {
            let attempt = match state {
                RetryState::Attempting { attempt } => attempt,
                RetryState::Backoff { delay, .. } => {
                    tokio::time::sleep(delay).await;
                    state = self.policy.resume(state);
                    continue;
                }
                RetryState::Exhausted { attempts } => {
                    return Err(FetchError::ExhaustedRetries {
                        symbol: symbol.clone(),
                        attempts,
                    });
                }
                // fetch_window returns on success before reaching this state.
                RetryState::Succeeded => unreachable!("success returns the body directly"),
            };

            let outcome = {
                let _permit = self.gate.acquire().await;
                match self.client.execute(HttpRequest::get(url.clone())).await {
                    Ok(response) if response.is_success() => return Ok(response.body),
                    Ok(response) if response.status == STATUS_SERVICE_UNAVAILABLE => {
                        warn!(symbol = %symbol, window = %range, attempt, "server overloaded (503), backing off");
                        AttemptOutcome::Overloaded
                    }
                    Ok(response) => {
                        warn!(symbol = %symbol, window = %range, attempt, status = response.status, "response error, backing off");
                        AttemptOutcome::Failed
                    }
                    Err(error) => {
                        warn!(symbol = %symbol, window = %range, attempt, %error, "transport error, backing off");
                        AttemptOutcome::Failed
                    }
                }
            };

            state = self.policy.observe(RetryState::Attempting { attempt }, outcome);
        }
    }
}
