//! Retry wrapper for catalog requests
//!
//! Connection errors and timeouts are retried with exponential backoff; HTTP error
//! statuses and every other request failure end the attempt loop immediately.

use crate::error::FetchError;
use reqwest::{Client as HttpClient, Response};
use std::future::Future;
use std::time::Duration;

const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub attempts: u32,
    /// Pause after the first failure; doubles after each further failure
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Backoff slept after the `failures`-th consecutive transient failure (1-based)
    pub fn backoff(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(16);
        self.initial_delay.saturating_mul(1 << exponent)
    }
}

/// Runs `operation` until it succeeds, fails permanently, or the attempts run out
///
/// The operation receives the zero-based attempt number. No sleep follows the last
/// attempt.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let attempts = policy.attempts.max(1);
    let mut failures = 0;

    loop {
        match operation(failures).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() => {
                failures += 1;
                if failures >= attempts {
                    tracing::warn!(attempts, error = %err, "Giving up after repeated transient failures");
                    return Err(FetchError::RetriesExhausted {
                        attempts,
                        last_error: err.to_string(),
                    });
                }

                let delay = policy.backoff(failures);
                tracing::warn!(
                    attempt = failures,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// GET `url` with `query`, retrying transient failures under `policy`
///
/// A non-2xx status is returned as [`FetchError::Status`] without retrying.
pub async fn fetch_with_retry(
    client: &HttpClient,
    url: &str,
    query: &[(&str, &str)],
    policy: &RetryPolicy,
) -> Result<Response, FetchError> {
    retry_with_backoff(policy, move |attempt| async move {
        tracing::debug!(url = %url, attempt = attempt + 1, "Fetching");

        let response = client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "Catalog returned error status");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    })
    .await
}
