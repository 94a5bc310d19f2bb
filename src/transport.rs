//! Transport adaptor contract and the reqwest-backed implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{HttpClientError, HttpHeader, HttpResponse, Method, RequestConfig, Result};

/// One logical in-flight request, created by a transport adaptor and consumed
/// by exactly one strategy.
///
/// `perform` may be invoked repeatedly; each invocation is a distinct physical
/// network attempt built from the same [`RequestConfig`].
#[async_trait]
pub trait RequestHandle: Send {
    async fn perform(&mut self) -> Result<HttpResponse>;
}

/// Transport adaptor capability consumed by [`crate::HttpClient`].
///
/// The client core never talks to a transport-specific API directly; this
/// three-operation surface is the entire contract.
pub trait HttpTransport: Send + Sync {
    /// Builds a repeatable request handle from a normalized config.
    fn build_request(&self, config: RequestConfig) -> Box<dyn RequestHandle>;

    /// Adds a header to every request built by this transport instance.
    fn add_global_header(&self, header: HttpHeader);

    /// Adds several global headers at once.
    fn add_global_headers(&self, headers: Vec<HttpHeader>) {
        for header in headers {
            self.add_global_header(header);
        }
    }
}

/// [`HttpTransport`] backed by a shared [`reqwest::Client`].
///
/// Global headers are client-owned configuration, merged into each request at
/// build time; per-call headers win on conflict. A config with `no_global`
/// gets a fresh isolated `reqwest::Client` and no global headers.
#[derive(Debug, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    global_headers: Mutex<HashMap<String, String>>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a preconfigured `reqwest::Client` as the shared instance.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self {
            http,
            global_headers: Mutex::new(HashMap::new()),
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn build_request(&self, config: RequestConfig) -> Box<dyn RequestHandle> {
        let (client, global_headers) = if config.no_global {
            (reqwest::Client::new(), HashMap::new())
        } else {
            let snapshot = self
                .global_headers
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone();
            (self.http.clone(), snapshot)
        };
        Box::new(ReqwestHandle {
            client,
            global_headers,
            config,
        })
    }

    fn add_global_header(&self, header: HttpHeader) {
        self.global_headers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(header.name, header.value);
    }
}

struct ReqwestHandle {
    client: reqwest::Client,
    global_headers: HashMap<String, String>,
    config: RequestConfig,
}

impl ReqwestHandle {
    async fn dispatch(&self) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(to_reqwest_method(self.config.method), &self.config.url);

        for (name, value) in &self.global_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(headers) = &self.config.headers {
            for (name, value) in headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        if let Some(params) = &self.config.params {
            builder = builder.query(params);
        }
        if let Some(data) = &self.config.data {
            builder = builder.json(data);
        }

        let response = builder.send().await.map_err(HttpClientError::transport)?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_owned();
        let mut headers = HashMap::with_capacity(response.headers().len());
        for (name, value) in response.headers() {
            headers.insert(
                name.as_str().to_owned(),
                value.to_str().ok().map(str::to_owned),
            );
        }
        // The response_type/response_encoding hints do not change the wire
        // handling here: the body is always normalized to raw bytes and typed
        // decoding happens on HttpResponse.
        let data = response.bytes().await.map_err(HttpClientError::transport)?;

        Ok(HttpResponse {
            data,
            status,
            status_text,
            headers,
        })
    }
}

#[async_trait]
impl RequestHandle for ReqwestHandle {
    async fn perform(&mut self) -> Result<HttpResponse> {
        match self.config.cancel.clone() {
            Some(cancel) => {
                if cancel.is_aborted() {
                    return Err(HttpClientError::Aborted);
                }
                tokio::select! {
                    result = self.dispatch() => result,
                    _ = cancel.aborted() => Err(HttpClientError::Aborted),
                }
            }
            None => self.dispatch().await,
        }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}
