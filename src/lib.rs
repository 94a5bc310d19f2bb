//! `strata-http` is a typed async HTTP client layered over a pluggable
//! transport, with composable retry/backoff/timeout request strategies.
//!
//! The pieces:
//! - [`HttpClient`]: the facade that builds requests, resolves the strategy,
//!   binds cancellation, and logs lifecycle events.
//! - [`HttpRequestStrategy`]: the execution policy, with [`PassthroughStrategy`],
//!   [`ExponentialBackoffStrategy`], [`MaxRetryStrategy`], and the
//!   [`TimeoutStrategy`] decorator.
//! - [`HttpTransport`]: the adaptor performing actual network I/O;
//!   [`ReqwestTransport`] is the provided implementation.
//! - [`AbortSignal`]: cooperative cancellation, propagated to the transport
//!   at most once per request.
//!
//! ```no_run
//! use std::sync::Arc;
//! use strata_http::{ApiConfig, HttpClient, HttpClientOptions, MaxRetryStrategy};
//!
//! # async fn run() -> strata_http::Result<()> {
//! let client = HttpClient::with_reqwest(HttpClientOptions {
//!     http_request_strategy: Some(Arc::new(MaxRetryStrategy::new(3))),
//!     ..HttpClientOptions::default()
//! });
//! let pokemon: serde_json::Value = client
//!     .get("https://pokeapi.co/api/v2/pokemon/25", ApiConfig::default(), None)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod backoff;
mod cancel;
mod client;
mod config;
mod error;
mod logger;
mod response;
mod status;
mod strategy;
mod timeout;
mod transport;

pub use backoff::{BackoffOptions, ExponentialBackoffStrategy, MaxRetryStrategy};
pub use cancel::AbortSignal;
pub use client::{HttpClient, HttpClientOptions};
pub use config::{ApiConfig, HttpHeader, Method, RequestConfig, ResponseType};
pub use error::{is_client_error, HttpClientError, ABORT_MESSAGE, ERROR_URL};
pub use logger::{Logger, TracingLogger};
pub use response::HttpResponse;
pub use status::{is_successful, is_too_many_requests, TOO_MANY_REQUESTS};
pub use strategy::{check_response_status, HttpRequestStrategy, PassthroughStrategy};
pub use timeout::{TimeoutStrategy, DEFAULT_TIMEOUT};
pub use transport::{HttpTransport, ReqwestTransport, RequestHandle};

pub type Result<T> = std::result::Result<T, HttpClientError>;
