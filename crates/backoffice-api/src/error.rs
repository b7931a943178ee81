use thiserror::Error;

/// Top-level error type for the `backoffice-api` crate.
///
/// Only transport-level and malformed-response failures land here. A
/// well-formed `{ success: false, errorMessage }` body is *not* an error at
/// this layer -- it comes back as an [`Envelope`](crate::Envelope) and the
/// caller decides what to do with it. `backoffice-core` maps these into
/// user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured API base URL cannot carry path segments.
    #[error("API base URL cannot be used as a base: {url}")]
    InvalidBaseUrl { url: String },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// The response body was not a valid envelope, with the raw body for debugging.
    #[error("Malformed response (HTTP {status}): {message}")]
    Deserialization {
        message: String,
        status: u16,
        body: String,
    },
}

impl Error {
    /// Returns `true` if the request timed out at the transport.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}
