//! HTTP retry policy with exponential backoff.
//!
//! Divination requests are not retried by default: a failure is shown to the
//! user, who can simply ask again. Retries exist for deployments that opt in
//! through configuration.
//!
//! # Policy when enabled
//!
//! - Initial delay: 500ms, doubling per attempt
//! - Max delay: 8 seconds
//! - Jitter: down-jitter up to 25% (multiplier in [0.75, 1.0])
//! - `Retry-After` / `Retry-After-Ms` honoured when `0 < delay < 60s`
//!
//! # Retryable Conditions
//!
//! - HTTP 408, 409, 429, 5xx
//! - Connect, timeout and request-construction errors
//! - `x-should-retry: true|false` overrides the status rule
//!
//! Every attempt carries the same `Idempotency-Key` and an `X-Retry-Count`.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode, header::HeaderMap};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retries (not counting the initial request).
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Down-jitter factor (0.25 = up to 25% reduction).
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            jitter_factor: 0.25,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Parse `Retry-After-Ms` (float milliseconds) or `Retry-After` (integer seconds).
#[must_use]
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let in_range = |delay: &Duration| *delay > Duration::ZERO && *delay < Duration::from_secs(60);

    header("retry-after-ms")
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|ms| ms.is_finite() && *ms > 0.0)
        .map(|ms| Duration::from_secs_f64(ms / 1000.0))
        .filter(in_range)
        .or_else(|| {
            header("retry-after")
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
                .filter(in_range)
        })
}

/// Whether a failed response may be retried.
#[must_use]
pub fn should_retry(status: StatusCode, headers: &HeaderMap) -> bool {
    let forced = headers
        .get("x-should-retry")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| match s.to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        });

    forced.unwrap_or_else(|| {
        matches!(
            status.as_u16(),
            408 | 409 | 429 | 500 | 502 | 503 | 504 | 520..=599
        )
    })
}

/// Delay before retry number `backoff_step + 1`.
#[must_use]
pub fn calculate_retry_delay(
    backoff_step: u32,
    config: &RetryConfig,
    headers: Option<&HeaderMap>,
) -> Duration {
    if let Some(delay) = headers.and_then(parse_retry_after) {
        return delay;
    }

    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(backoff_step as i32);
    let capped = base.min(config.max_delay.as_secs_f64());
    let jitter = 1.0 - rand::random::<f64>() * config.jitter_factor;
    Duration::from_secs_f64(capped * jitter)
}

#[must_use]
pub fn generate_idempotency_key() -> String {
    format!("gua-{}", Uuid::new_v4())
}

/// Outcome of a (possibly retried) request.
#[derive(Debug)]
pub enum RetryOutcome {
    /// 2xx response.
    Success(Response),
    /// Non-2xx response, either non-retryable or the last attempt.
    HttpError(Response),
    /// Transport failure on the last permitted attempt.
    ConnectionError {
        attempts: u32,
        source: reqwest::Error,
    },
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout() || error.is_request()
}

/// Send a request, retrying per `config`.
///
/// `build_request` is called once per attempt.
pub async fn send_with_retry<F>(build_request: F, config: &RetryConfig) -> RetryOutcome
where
    F: Fn() -> RequestBuilder,
{
    let idempotency_key = generate_idempotency_key();
    let mut attempt = 0u32;

    loop {
        let is_last = attempt >= config.max_retries;
        let request = build_request()
            .header("X-Retry-Count", attempt.to_string())
            .header("Idempotency-Key", &idempotency_key);

        let delay = match request.send().await {
            Ok(response) if response.status().is_success() => {
                return RetryOutcome::Success(response);
            }
            Ok(response) => {
                if is_last || !should_retry(response.status(), response.headers()) {
                    return RetryOutcome::HttpError(response);
                }
                let delay = calculate_retry_delay(attempt, config, Some(response.headers()));
                tracing::debug!(
                    status = %response.status(),
                    retry_count = attempt + 1,
                    delay_ms = delay.as_millis(),
                    "Retrying request after error status"
                );
                delay
            }
            Err(e) => {
                if is_last || !is_retryable_error(&e) {
                    return RetryOutcome::ConnectionError {
                        attempts: attempt + 1,
                        source: e,
                    };
                }
                let delay = calculate_retry_delay(attempt, config, None);
                tracing::debug!(
                    error = %e,
                    retry_count = attempt + 1,
                    delay_ms = delay.as_millis(),
                    "Retrying request after connection error"
                );
                delay
            }
        };

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
