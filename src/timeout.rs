//! Deadline decorator over any inner request strategy.

use std::time::Duration;

use async_trait::async_trait;

use crate::strategy::{HttpRequestStrategy, PassthroughStrategy};
use crate::{HttpClientError, HttpResponse, RequestHandle, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Races an inner strategy against a deadline.
///
/// On expiry the request fails with [`HttpClientError::Timeout`]; otherwise
/// the inner outcome passes through untouched. Exactly one of the two wins,
/// and the timer is dropped with the race either way, so nothing leaks. The
/// deadline covers the inner strategy's whole run, so wrapping a retrying
/// strategy bounds its total time, not each attempt.
pub struct TimeoutStrategy {
    timeout: Duration,
    inner: Box<dyn HttpRequestStrategy>,
}

impl TimeoutStrategy {
    /// Deadline over a single validated attempt ([`PassthroughStrategy`]).
    pub fn new(timeout: Duration) -> Self {
        Self::wrapping(timeout, Box::new(PassthroughStrategy))
    }

    /// Deadline over an arbitrary inner strategy.
    pub fn wrapping(timeout: Duration, inner: Box<dyn HttpRequestStrategy>) -> Self {
        Self { timeout, inner }
    }
}

impl Default for TimeoutStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl HttpRequestStrategy for TimeoutStrategy {
    async fn execute(&self, handle: &mut dyn RequestHandle) -> Result<HttpResponse> {
        match tokio::time::timeout(self.timeout, self.inner.execute(handle)).await {
            Ok(result) => result,
            Err(_) => Err(HttpClientError::Timeout),
        }
    }
}
