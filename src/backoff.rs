//! Retrying strategies: exponential backoff and immediate fixed-count retry.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::strategy::HttpRequestStrategy;
use crate::{status, HttpResponse, RequestHandle, Result};

/// Configuration for [`ExponentialBackoffStrategy`], resolved at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackoffOptions {
    /// Delay before the first attempt too, not only before retries.
    pub delay_first_request: bool,
    /// Maximum number of attempts; 0 means retry indefinitely. Unlimited
    /// retries rely on an eventual success, a 429, or external cancellation
    /// to terminate; that is the caller's contract, not a capped default.
    pub max_retry_count: u32,
    /// Starting delay used to grow the backoff.
    pub base_delay: Duration,
    /// Cap applied to the grown delay; `None` leaves it uncapped.
    pub max_delay: Option<Duration>,
    /// Multiplier applied to the delay growth between retries.
    pub factor: u32,
}

impl Default for BackoffOptions {
    fn default() -> Self {
        Self {
            delay_first_request: false,
            max_retry_count: 5,
            base_delay: Duration::from_millis(100),
            max_delay: None,
            factor: 2,
        }
    }
}

/// Retries attempts with a growing delay until the response is successful, is
/// a 429, or the retry budget is spent.
///
/// The delay grows as `delay = delay * factor * attempt` with 1-indexed
/// attempts, which climbs faster than a classic `base * factor^attempt`
/// curve; downstream behavior depends on this exact growth rate, so it is
/// kept as-is.
///
/// A 429 terminates the loop immediately and is returned as a normal
/// response: the server asked us to stop hammering, which is neither a
/// success nor a failure worth retrying. On retry exhaustion the last
/// response is likewise returned without error; classifying it is the
/// caller's job (compose with [`crate::PassthroughStrategy`] semantics or let
/// the client's data path do it).
#[derive(Clone, Debug)]
pub struct ExponentialBackoffStrategy {
    options: BackoffOptions,
}

impl ExponentialBackoffStrategy {
    pub fn new(options: BackoffOptions) -> Self {
        Self { options }
    }

    fn is_at_retry_max(&self, retry_count: u32) -> bool {
        self.options.max_retry_count != 0 && retry_count >= self.options.max_retry_count
    }

    fn should_delay(&self, retry_count: u32) -> bool {
        retry_count != 0 || self.options.delay_first_request
    }
}

impl Default for ExponentialBackoffStrategy {
    fn default() -> Self {
        Self::new(BackoffOptions::default())
    }
}

#[async_trait]
impl HttpRequestStrategy for ExponentialBackoffStrategy {
    async fn execute(&self, handle: &mut dyn RequestHandle) -> Result<HttpResponse> {
        let factor = u64::from(self.options.factor);
        let max_delay_ms = self.options.max_delay.map(duration_to_millis);
        let mut delay_ms = duration_to_millis(self.options.base_delay);
        let mut retry_count: u32 = 0;

        loop {
            if self.should_delay(retry_count) {
                if retry_count != 0 {
                    tracing::debug!("retrying request after {} ms", delay_ms);
                }
                sleep(Duration::from_millis(delay_ms)).await;
            }
            retry_count += 1;

            let response = handle.perform().await?;
            let done = status::is_successful(response.status)
                || status::is_too_many_requests(response.status)
                || self.is_at_retry_max(retry_count);

            delay_ms = delay_ms.saturating_mul(factor.saturating_mul(u64::from(retry_count)));
            if let Some(max) = max_delay_ms {
                delay_ms = delay_ms.min(max);
            }

            if done {
                return Ok(response);
            }
        }
    }
}

/// Retries immediately, with no delay, up to a fixed count.
///
/// A parameterization of [`ExponentialBackoffStrategy`] (`factor = 1`, zero
/// base delay, zero delay cap) held by composition; termination rules are
/// identical, including the 429 short-circuit.
#[derive(Clone, Debug)]
pub struct MaxRetryStrategy {
    inner: ExponentialBackoffStrategy,
}

impl MaxRetryStrategy {
    /// `max_retry_count` of 0 retries indefinitely.
    pub fn new(max_retry_count: u32) -> Self {
        Self {
            inner: ExponentialBackoffStrategy::new(BackoffOptions {
                delay_first_request: false,
                max_retry_count,
                base_delay: Duration::ZERO,
                max_delay: Some(Duration::ZERO),
                factor: 1,
            }),
        }
    }
}

impl Default for MaxRetryStrategy {
    fn default() -> Self {
        Self::new(5)
    }
}

#[async_trait]
impl HttpRequestStrategy for MaxRetryStrategy {
    async fn execute(&self, handle: &mut dyn RequestHandle) -> Result<HttpResponse> {
        self.inner.execute(handle).await
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
