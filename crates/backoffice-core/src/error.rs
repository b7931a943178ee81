// ── Core error types ──
//
// User-facing errors from backoffice-core. Consumers never see reqwest or
// serde errors directly; `From<backoffice_api::Error>` flattens them into
// string-carrying variants so the type stays `Clone` and can ride along in
// notices.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Backend returned a malformed response (HTTP {status}): {message}")]
    MalformedResponse { status: u16, message: String },

    // ── Session storage ──────────────────────────────────────────────
    #[error("Session storage ({scope}) failed: {message}")]
    Storage { scope: String, message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn storage(scope: &str, err: impl std::fmt::Display) -> Self {
        Self::Storage {
            scope: scope.to_owned(),
            message: err.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<backoffice_api::Error> for CoreError {
    fn from(err: backoffice_api::Error) -> Self {
        match err {
            backoffice_api::Error::Transport(ref e) => {
                let url = e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string);
                if err.is_timeout() {
                    CoreError::Timeout { url }
                } else {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                }
            }
            backoffice_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            backoffice_api::Error::InvalidBaseUrl { url } => CoreError::Config {
                message: format!("API URL cannot be used as a base: {url}"),
            },
            backoffice_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            backoffice_api::Error::Deserialization {
                message,
                status,
                body: _,
            } => CoreError::MalformedResponse { status, message },
        }
    }
}
