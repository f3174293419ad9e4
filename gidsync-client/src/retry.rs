//! Resilient fetch
//!
//! One logical GET with a bounded attempt budget:
//! - 200 returns the body
//! - network errors, unreadable bodies and 500/502/503/504 sleep the current
//!   backoff and try again
//! - 429 sleeps for `Retry-After` seconds when the header is valid, otherwise
//!   the current backoff
//! - any other status fails immediately with the response body
//!
//! The backoff starts at [`BASE_BACKOFF`] and doubles after every attempt,
//! whichever retryable branch was taken.

use reqwest::Url;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use std::time::Duration;
use tracing::{debug, warn};

use crate::ApiClient;
use crate::error::{AttemptFailure, ClientError, Result};
use crate::transport::HttpRequest;

/// Delay before the first retry
pub const BASE_BACKOFF: Duration = Duration::from_millis(500);

/// Attempt budget used by the resource fetchers
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

impl ApiClient {
    /// GET `url` with the bearer credential, retrying up to `max_attempts` times
    ///
    /// Returns the complete body of the first 200 response. Request
    /// construction errors and terminal statuses bypass the budget; when every
    /// attempt fails retryably the last failure is returned inside
    /// [`ClientError::RetriesExhausted`].
    pub async fn fetch_with_retry(&self, url: &str, max_attempts: u32) -> Result<Vec<u8>> {
        let url = Url::parse(url)
            .map_err(|e| ClientError::InvalidRequest(format!("Malformed URL {:?}: {}", url, e)))?;
        let authorization = self.authorization()?;

        let mut backoff = BASE_BACKOFF;
        let mut last_failure = None;

        for attempt in 1..=max_attempts {
            debug!(%url, attempt, max_attempts, "Sending request");

            let request =
                HttpRequest::get(url.clone()).with_header(AUTHORIZATION, authorization.clone());

            let (failure, delay) = match self.transport.send(request).await {
                Err(source) => (AttemptFailure::Transport { attempt, source }, backoff),
                Ok(response) => {
                    let status = response.status();
                    let retry_after = retry_after(response.headers());

                    match response.read_body().await {
                        Err(source) => (AttemptFailure::BodyRead { attempt, source }, backoff),
                        Ok(body) => match status {
                            200 => return Ok(body),
                            429 => (
                                AttemptFailure::RateLimited { attempt },
                                retry_after.unwrap_or(backoff),
                            ),
                            500 | 502 | 503 | 504 => {
                                (AttemptFailure::ServerError { attempt, status }, backoff)
                            }
                            _ => {
                                return Err(ClientError::api_error(
                                    status,
                                    String::from_utf8_lossy(&body),
                                ));
                            }
                        },
                    }
                }
            };

            if attempt < max_attempts {
                warn!(
                    %url,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "{}, retrying",
                    failure
                );
                tokio::time::sleep(delay).await;
            } else {
                warn!(%url, attempt, max_attempts, "{}, giving up", failure);
            }

            last_failure = Some(failure);
            backoff = backoff.saturating_mul(2);
        }

        Err(match last_failure {
            Some(last) => ClientError::RetriesExhausted {
                attempts: max_attempts,
                last,
            },
            None => ClientError::InvalidRequest("Attempt budget must be positive".to_string()),
        })
    }

    fn authorization(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.token)).map_err(|_| {
            ClientError::InvalidRequest("Credential is not a valid header value".to_string())
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// Server-directed delay: a non-negative number of seconds
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    let digits = value.chars().filter(char::is_ascii_digit).count();
    let dots = value.chars().filter(|&c| c == '.').count();
    if digits == 0 || dots > 1 || digits + dots != value.len() {
        return None;
    }
    let seconds: f64 = value.parse().ok()?;
    Duration::try_from_secs_f64(seconds).ok()
}
