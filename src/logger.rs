use crate::HttpClientError;

/// Logging capability consumed by [`crate::HttpClient`].
///
/// Absence of a logger is valid; the client skips every log call when none is
/// set. [`TracingLogger`] forwards to the `tracing` macros.
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    /// Error log with the failing request's error attached, when available.
    fn error(&self, message: &str, error: Option<&HttpClientError>);
}

/// [`Logger`] implementation emitting through the `tracing` macros.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str, error: Option<&HttpClientError>) {
        match error {
            Some(error) => tracing::error!(error = %error, "{message}"),
            None => tracing::error!("{message}"),
        }
    }
}
