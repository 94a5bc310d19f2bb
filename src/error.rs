use crate::HttpResponse;

/// Fixed message carried by [`HttpClientError::InvalidUrl`].
pub const ERROR_URL: &str = "url must be a non-empty string";

/// Fixed message carried by [`HttpClientError::Aborted`].
pub const ABORT_MESSAGE: &str = "request aborted";

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    /// The url failed validation before any network attempt.
    #[error("{ERROR_URL}")]
    InvalidUrl,
    /// The request was cancelled through an abort signal.
    #[error("{ABORT_MESSAGE}")]
    Aborted,
    /// A timeout strategy's deadline elapsed before the inner strategy finished.
    #[error("request timed out")]
    Timeout,
    /// Non-success HTTP response. The failed response itself is the payload;
    /// status, headers and body all survive into the error.
    #[error("http error {}: {}", .0.status, .0.status_text)]
    Failed(Box<HttpResponse>),
    /// Network or request execution error from the transport.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Response body decoding error.
    #[error("decode error: {0}")]
    Decode(String),
}

impl HttpClientError {
    /// Wraps a transport-native error without reclassifying it.
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport(Box::new(err))
    }

    /// The failed response carried by [`HttpClientError::Failed`], if any.
    pub fn failed_response(&self) -> Option<&HttpResponse> {
        match self {
            Self::Failed(response) => Some(response),
            _ => None,
        }
    }
}

/// Returns `true` if a caught error value belongs to this crate's taxonomy.
pub fn is_client_error(err: &(dyn std::error::Error + 'static)) -> bool {
    err.downcast_ref::<HttpClientError>().is_some()
}
