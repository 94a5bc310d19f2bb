use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::cancel::AbortSignal;
use crate::strategy::HttpRequestStrategy;

/// HTTP method for a request, one per client verb helper.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Lowercase method name, as it appears in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hint for how the caller intends to consume the response body.
///
/// Transports normalize every body to raw bytes; the hint lets an adaptor pick
/// a wire-level optimization (e.g. streaming) when it supports one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseType {
    ArrayBuffer,
    Blob,
    Document,
    Json,
    Text,
    Stream,
}

/// A single HTTP header name/value pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

impl HttpHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Per-call configuration accepted by every [`crate::HttpClient`] method.
#[derive(Clone, Default)]
pub struct ApiConfig {
    /// Bypass the shared transport instance (and its global headers) for this
    /// call, using an isolated one instead.
    pub no_global: bool,
    /// Headers for this call. Global headers are merged in by the transport;
    /// per-call values win on conflict.
    pub headers: Option<HashMap<String, String>>,
    /// Request body, serialized by the transport.
    pub data: Option<JsonValue>,
    /// Expected response type.
    pub response_type: Option<ResponseType>,
    /// Query parameters appended to the url.
    pub params: Option<JsonValue>,
    /// Encoding of the response body.
    pub response_encoding: Option<String>,
    /// Strategy override for this call; falls back to the client-wide default.
    pub http_request_strategy: Option<Arc<dyn HttpRequestStrategy>>,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("no_global", &self.no_global)
            .field("headers", &self.headers)
            .field("data", &self.data)
            .field("response_type", &self.response_type)
            .field("params", &self.params)
            .field("response_encoding", &self.response_encoding)
            .field(
                "http_request_strategy",
                &self.http_request_strategy.as_ref().map(|_| "<strategy>"),
            )
            .finish()
    }
}

impl ApiConfig {
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_params(mut self, params: JsonValue) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn HttpRequestStrategy>) -> Self {
        self.http_request_strategy = Some(strategy);
        self
    }

    pub fn isolated(mut self) -> Self {
        self.no_global = true;
        self
    }
}

/// Normalized request configuration handed to a transport adaptor.
///
/// Built fresh by the client for every call and not mutated afterwards.
#[derive(Clone, Debug)]
pub struct RequestConfig {
    pub url: String,
    pub method: Method,
    pub no_global: bool,
    pub headers: Option<HashMap<String, String>>,
    pub data: Option<JsonValue>,
    pub response_type: Option<ResponseType>,
    pub params: Option<JsonValue>,
    pub response_encoding: Option<String>,
    /// Transport-side cancel primitive for this request. The client binds the
    /// caller's external signal to this one; transports observe only this.
    pub cancel: Option<AbortSignal>,
}
