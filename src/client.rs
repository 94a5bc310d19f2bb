use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::cancel::{AbortSignal, CancelBinding};
use crate::logger::Logger;
use crate::strategy::{HttpRequestStrategy, PassthroughStrategy};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::{ApiConfig, HttpClientError, HttpHeader, HttpResponse, Method, RequestConfig, Result};

/// Construction options for [`HttpClient`].
#[derive(Default)]
pub struct HttpClientOptions {
    /// Client-wide default strategy; passthrough when unset.
    pub http_request_strategy: Option<Arc<dyn HttpRequestStrategy>>,
    /// Logger consumed for lifecycle events; absence is valid.
    pub logger: Option<Arc<dyn Logger>>,
    /// Prefix applied to every request url.
    pub base_url: Option<String>,
}

/// Typed wrapper around a transport adaptor that standardizes making HTTP
/// calls and handling responses.
///
/// The client owns per-request orchestration: url validation, request config
/// construction, strategy resolution, cancellation binding, lifecycle logging
/// and outcome normalization. It never recovers from errors itself; retry
/// logic lives entirely in the strategies.
pub struct HttpClient {
    transport: Arc<dyn HttpTransport>,
    http_request_strategy: Arc<dyn HttpRequestStrategy>,
    logger: Option<Arc<dyn Logger>>,
    base_url: String,
}

impl HttpClient {
    pub fn new(transport: Arc<dyn HttpTransport>, options: HttpClientOptions) -> Self {
        let HttpClientOptions {
            http_request_strategy,
            logger,
            base_url,
        } = options;
        Self {
            transport,
            http_request_strategy: http_request_strategy
                .unwrap_or_else(|| Arc::new(PassthroughStrategy)),
            logger,
            base_url: base_url.unwrap_or_default(),
        }
    }

    /// Client over a fresh [`ReqwestTransport`].
    pub fn with_reqwest(options: HttpClientOptions) -> Self {
        Self::new(Arc::new(ReqwestTransport::new()), options)
    }

    /// Sets or clears the logger for this instance.
    pub fn set_logger(&mut self, logger: Option<Arc<dyn Logger>>) {
        self.logger = logger;
    }

    /// Adds a header to every request issued through the shared transport
    /// instance. Calls with `no_global` set bypass these.
    pub fn add_global_api_header(&self, header: HttpHeader) {
        self.transport.add_global_header(header);
    }

    /// Adds several global headers at once.
    pub fn add_global_api_headers(&self, headers: Vec<HttpHeader>) {
        self.transport.add_global_headers(headers);
    }

    /// HTTP GET request returning the decoded response body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        config: ApiConfig,
        signal: Option<&AbortSignal>,
    ) -> Result<T> {
        self.data_request(url, Method::Get, config, signal).await
    }

    /// HTTP POST request returning the decoded response body.
    pub async fn post<T: DeserializeOwned>(
        &self,
        url: &str,
        config: ApiConfig,
        signal: Option<&AbortSignal>,
    ) -> Result<T> {
        self.data_request(url, Method::Post, config, signal).await
    }

    /// HTTP PUT request returning the decoded response body.
    pub async fn put<T: DeserializeOwned>(
        &self,
        url: &str,
        config: ApiConfig,
        signal: Option<&AbortSignal>,
    ) -> Result<T> {
        self.data_request(url, Method::Put, config, signal).await
    }

    /// HTTP PATCH request returning the decoded response body.
    pub async fn patch<T: DeserializeOwned>(
        &self,
        url: &str,
        config: ApiConfig,
        signal: Option<&AbortSignal>,
    ) -> Result<T> {
        self.data_request(url, Method::Patch, config, signal).await
    }

    /// HTTP DELETE request returning the decoded response body.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        url: &str,
        config: ApiConfig,
        signal: Option<&AbortSignal>,
    ) -> Result<T> {
        self.data_request(url, Method::Delete, config, signal).await
    }

    /// HTTP request returning the decoded body of the response.
    ///
    /// Errors propagate unchanged from [`HttpClient::request`].
    pub async fn data_request<T: DeserializeOwned>(
        &self,
        url: &str,
        method: Method,
        config: ApiConfig,
        signal: Option<&AbortSignal>,
    ) -> Result<T> {
        let response = self.request(url, method, config, signal).await?;
        response.json()
    }

    /// HTTP request returning the full normalized response.
    ///
    /// If a cancellation signal is passed in, it is aborted on request error;
    /// the abort is idempotent and never reaches the transport twice.
    pub async fn request(
        &self,
        url: &str,
        method: Method,
        config: ApiConfig,
        signal: Option<&AbortSignal>,
    ) -> Result<HttpResponse> {
        let result = self.do_request(url, method, config, signal).await;
        if result.is_err() {
            if let Some(signal) = signal {
                signal.abort();
            }
        }
        result
    }

    async fn do_request(
        &self,
        url: &str,
        method: Method,
        config: ApiConfig,
        signal: Option<&AbortSignal>,
    ) -> Result<HttpResponse> {
        if url.trim().is_empty() {
            return Err(HttpClientError::InvalidUrl);
        }
        let ApiConfig {
            no_global,
            headers,
            data,
            response_type,
            params,
            response_encoding,
            http_request_strategy,
        } = config;

        let strategy =
            http_request_strategy.unwrap_or_else(|| Arc::clone(&self.http_request_strategy));

        // Per-request transport-side cancel primitive; the caller's external
        // signal only ever reaches the transport through the binding.
        let transport_cancel = AbortSignal::new();
        let request_config = RequestConfig {
            url: format!("{}{}", self.base_url, url),
            method,
            no_global,
            headers,
            data,
            response_type,
            params,
            response_encoding,
            cancel: Some(transport_cancel.clone()),
        };

        let mut binding = CancelBinding::new(transport_cancel);
        if let Some(signal) = signal {
            if signal.is_aborted() {
                binding.fire();
                return Err(HttpClientError::Aborted);
            }
        }

        self.log_debug(&format!("HTTP - method: {method}; url: {url}"));
        let mut handle = self.transport.build_request(request_config);

        let result = match signal {
            Some(signal) => {
                let exec = strategy.execute(handle.as_mut());
                tokio::pin!(exec);
                tokio::select! {
                    result = &mut exec => result,
                    _ = signal.aborted() => {
                        // Cancel the transport at most once, then let the
                        // in-flight execution observe the abort and settle.
                        binding.fire();
                        exec.await
                    }
                }
            }
            None => strategy.execute(handle.as_mut()).await,
        };
        binding.resolve();

        match result {
            Ok(response) => {
                self.log_debug(&format!(
                    "HTTP {} - method: {method}; url: {url}",
                    response.status
                ));
                Ok(response)
            }
            Err(err) => {
                self.log_error(&format!("HTTP error - method: {method}; url: {url}"), &err);
                Err(err)
            }
        }
    }

    fn log_debug(&self, message: &str) {
        if let Some(logger) = &self.logger {
            logger.debug(message);
        }
    }

    fn log_error(&self, message: &str, error: &HttpClientError) {
        if let Some(logger) = &self.logger {
            logger.error(message, Some(error));
        }
    }
}
