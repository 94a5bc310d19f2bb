//! Request execution strategies: pluggable retry/backoff/timeout policies
//! operating over an abstract [`RequestHandle`].

use async_trait::async_trait;

use crate::{status, HttpClientError, HttpResponse, RequestHandle, Result};

/// How HTTP calls are executed. Implementations decide when to re-attempt,
/// when to give up, and what counts as a final response.
#[async_trait]
pub trait HttpRequestStrategy: Send + Sync {
    /// Drives the handle to a final response. May invoke `perform` any number
    /// of times; attempts are strictly sequential.
    async fn execute(&self, handle: &mut dyn RequestHandle) -> Result<HttpResponse>;
}

/// The default strategy: a single attempt with status validation.
///
/// A non-2xx response is returned as [`HttpClientError::Failed`] carrying the
/// response itself, so callers keep full access to status, headers and body.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughStrategy;

#[async_trait]
impl HttpRequestStrategy for PassthroughStrategy {
    async fn execute(&self, handle: &mut dyn RequestHandle) -> Result<HttpResponse> {
        let response = handle.perform().await?;
        check_response_status(response)
    }
}

/// Validates that a response is successful, turning a non-2xx response into
/// the error payload itself.
pub fn check_response_status(response: HttpResponse) -> Result<HttpResponse> {
    if status::is_successful(response.status) {
        Ok(response)
    } else {
        Err(HttpClientError::Failed(Box::new(response)))
    }
}
