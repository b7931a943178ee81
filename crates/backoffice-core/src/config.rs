// ── Runtime connection configuration ──
//
// Describes *how* to reach the backend. Never touches disk; the CLI builds
// a `ClientConfig` from its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use backoffice_api::{TlsMode, TransportConfig};
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict). Default: the backend sits behind a public cert.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (staging backends with self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for talking to one backend deployment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `https://api.example.com/api`.
    pub api_url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout, enforced by the transport.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}
