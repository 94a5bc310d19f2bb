use std::collections::HashMap;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::{HttpClientError, Result};

/// Normalized response produced by a transport, one per completed attempt.
///
/// The body is kept as raw bytes at this layer; typed decoding happens at the
/// client edge via [`HttpResponse::json`] or [`HttpResponse::text`] once the
/// active strategy has settled on a final response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// Response body bytes.
    pub data: Bytes,
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase for the status code, empty when the transport has none.
    pub status_text: String,
    /// Response headers. Values the transport could not represent as text
    /// (e.g. non-UTF-8 header bytes) are `None`.
    pub headers: HashMap<String, Option<String>>,
}

impl HttpResponse {
    /// Decodes the body as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.data)
            .map_err(|err| HttpClientError::Decode(format!("invalid JSON body: {err}")))
    }

    /// Decodes the body as UTF-8 text, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    /// Looks up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.as_deref())
    }
}
