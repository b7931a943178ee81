//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError`, `ConfigError`, and error notices into user-facing
//! errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use backoffice_config::ConfigError;
use backoffice_core::{CoreError, Notice};

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend at {url}: {reason}")]
    #[diagnostic(
        code(backoffice::connection_failed),
        help(
            "Check that the API is running and that api_url is correct.\n\
             Self-signed certificate? Use --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(backoffice::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { url: String },

    #[error("Backend returned a malformed response (HTTP {status})")]
    #[diagnostic(
        code(backoffice::malformed_response),
        help("The API URL may point at something other than the site backend: {message}")
    )]
    MalformedResponse { status: u16, message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not logged in")]
    #[diagnostic(
        code(backoffice::not_authenticated),
        help("Admin commands need a session. Run: backoffice login --profile {profile}")
    )]
    NotAuthenticated { profile: String },

    #[error("Login failed: {message}")]
    #[diagnostic(code(backoffice::login_rejected))]
    LoginRejected { message: String },

    #[error("Session storage failed: {message}")]
    #[diagnostic(
        code(backoffice::session_storage),
        help("Try the file session backend: backoffice config set session file")
    )]
    SessionStorage { message: String },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(backoffice::rejected))]
    Rejected { message: String },

    #[error("{message}")]
    #[diagnostic(code(backoffice::request_failed))]
    RequestFailed {
        message: String,
        #[source]
        source: Box<CliError>,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(backoffice::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(backoffice::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: backoffice config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(backoffice::no_config),
        help(
            "Create a profile with: backoffice config init\n\
             Or pass --api-url / set BACKOFFICE_API_URL.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(backoffice::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(backoffice::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(backoffice::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(backoffice::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::MalformedResponse { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotAuthenticated { .. } | Self::LoginRejected { .. } => exit_code::AUTH,
            Self::RequestFailed { source, .. } => source.exit_code(),
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Turn an error notice into an error. Success notices yield `None`.
    pub fn from_notice(notice: Notice) -> Option<Self> {
        match notice {
            Notice::Success(_) => None,
            Notice::Error {
                message,
                cause: None,
            } => Some(Self::Rejected { message }),
            Notice::Error {
                message,
                cause: Some(cause),
            } => Some(Self::RequestFailed {
                message,
                source: Box::new(cause.into()),
            }),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout { url } => CliError::Timeout { url },
            CoreError::MalformedResponse { status, message } => {
                CliError::MalformedResponse { status, message }
            }
            CoreError::Storage { scope, message } => CliError::SessionStorage {
                message: format!("{scope}: {message}"),
            },
            CoreError::Config { message } | CoreError::Internal(message) => {
                CliError::Config { message }
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: "(none)".into(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn success_notice_is_not_an_error() {
        assert!(CliError::from_notice(Notice::success("ok")).is_none());
    }

    #[test]
    fn rejected_notice_exits_general() {
        let err = CliError::from_notice(Notice::error("Validation failed")).unwrap();
        assert_eq!(err.exit_code(), exit_code::GENERAL);
        assert_eq!(err.to_string(), "Validation failed");
    }

    #[test]
    fn transport_notice_exits_with_cause_code() {
        let err = CliError::from_notice(Notice::Error {
            message: "Failed to load blogs".into(),
            cause: Some(CoreError::Timeout {
                url: "http://localhost/api/blogs".into(),
            }),
        })
        .unwrap();
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
        assert_eq!(err.to_string(), "Failed to load blogs");
    }
}
