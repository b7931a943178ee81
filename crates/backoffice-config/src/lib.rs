//! Shared configuration for the back-office CLI.
//!
//! TOML profiles, the persistent session scope for each profile (session
//! file or system keyring), password resolution, and translation to
//! `backoffice_core::ClientConfig`. The CLI adds `GlobalOpts`-aware
//! wrappers on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use backoffice_core::{
    ClientConfig, CoreError, FileStorage, MemoryStorage, SessionStore, TlsVerification,
    TokenStorage,
};

const KEYRING_SERVICE: &str = "backoffice";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by name, or the default profile when `name` is
    /// `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let wanted = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(wanted)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: wanted.into(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// Where a profile's session token persists between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// JSON file in the platform data directory.
    #[default]
    File,
    /// System keyring.
    Keyring,
}

/// A named backend profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// API root (e.g., "https://api.example.com/api").
    pub api_url: String,

    /// Admin login email.
    pub email: Option<String>,

    /// Environment variable name containing the admin password.
    pub password_env: Option<String>,

    /// Persistent session scope.
    #[serde(default)]
    pub session: SessionBackend,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "backoffice", "backoffice")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || fallback_dir(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Session file for `profile_name` when the file backend is in use.
pub fn session_path(profile_name: &str) -> PathBuf {
    let dir = project_dirs().map_or_else(
        || fallback_dir(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    );
    dir.join("sessions").join(format!("{profile_name}.json"))
}

fn fallback_dir(relative: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(relative);
    p.push("backoffice");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path, then apply `BACKOFFICE_` env overrides.
///
/// Nested keys use a double underscore: `BACKOFFICE_DEFAULTS__TIMEOUT=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("BACKOFFICE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, falling back to defaults when it is missing or unreadable.
///
/// Read-only views only. Anything that saves the config afterwards must use
/// [`load_config`] so a broken file is reported instead of replaced.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Password resolution ─────────────────────────────────────────────

/// Resolve the admin password without prompting.
///
/// Order: the profile's `password_env`, then `BACKOFFICE_PASSWORD`, then
/// the system keyring. `None` means the caller should prompt.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. Global env var
    if let Ok(val) = std::env::var("BACKOFFICE_PASSWORD") {
        return Some(SecretString::from(val));
    }

    // 3. System keyring
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
        .and_then(|entry| entry.get_password())
        .ok()
        .map(SecretString::from)
}

/// Store the admin password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
        .and_then(|entry| entry.set_password(password))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

// ── Session scopes ──────────────────────────────────────────────────

/// Persistent session scope backed by the system keyring.
///
/// Each key is stored as its own entry named `{profile}/{key}`.
#[derive(Debug, Clone)]
pub struct KeyringStorage {
    profile: String,
}

impl KeyringStorage {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, CoreError> {
        keyring::Entry::new(KEYRING_SERVICE, &format!("{}/{key}", self.profile))
            .map_err(|e| keyring_error(&e))
    }
}

fn keyring_error(err: &keyring::Error) -> CoreError {
    CoreError::Storage {
        scope: "keyring".into(),
        message: err.to_string(),
    }
}

impl TokenStorage for KeyringStorage {
    fn scope(&self) -> &str {
        "keyring"
    }

    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(keyring_error(&e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| keyring_error(&e))
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(keyring_error(&e)),
        }
    }
}

/// The session store for a profile: its persistent scope as primary, a
/// process-lived memory scope as secondary.
pub fn session_store(profile: &Profile, profile_name: &str) -> SessionStore {
    match profile.session {
        SessionBackend::File => {
            let path = session_path(profile_name);
            debug!(path = %path.display(), "using file session scope");
            SessionStore::new(FileStorage::new(path), MemoryStorage::new())
        }
        SessionBackend::Keyring => {
            debug!(profile = profile_name, "using keyring session scope");
            SessionStore::new(KeyringStorage::new(profile_name), MemoryStorage::new())
        }
    }
}

// ── Client configuration ────────────────────────────────────────────

/// Build a `ClientConfig` from a profile plus global defaults, without CLI
/// flag overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let api_url = parse_api_url(&profile.api_url)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(ClientConfig {
        api_url,
        tls,
        timeout,
    })
}

/// Parse and validate an API root URL.
pub fn parse_api_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn profile(api_url: &str) -> Profile {
        Profile {
            api_url: api_url.into(),
            email: Some("admin@example.com".into()),
            password_env: None,
            session: SessionBackend::File,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.defaults.timeout, 30);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn save_then_load_round_trips_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        let mut staging = profile("https://staging.example.com/api");
        staging.session = SessionBackend::Keyring;
        staging.timeout = Some(5);
        cfg.profiles.insert("staging".into(), staging);
        cfg.default_profile = Some("staging".into());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let (name, staging) = loaded.profile(None).unwrap();
        assert_eq!(name, "staging");
        assert_eq!(staging.api_url, "https://staging.example.com/api");
        assert_eq!(staging.session, SessionBackend::Keyring);
        assert_eq!(staging.timeout, Some(5));
    }

    #[test]
    fn session_backend_defaults_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[profiles.default]\napi_url = \"https://api.example.com/api\"\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        let (_, default) = cfg.profile(None).unwrap();
        assert_eq!(default.session, SessionBackend::File);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[profiles.staging]\napi_url = \"https://api.example.com/api\"\ntimeout = \"x\"\n",
        )
        .unwrap();

        assert!(matches!(
            load_config_from(&path),
            Err(ConfigError::Figment(_))
        ));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = Config::default();
        let err = cfg.profile(Some("prod")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { profile } if profile == "prod"));
    }

    #[test]
    fn client_config_applies_overrides() {
        let defaults = Defaults::default();

        let plain = profile_to_client_config(&profile("https://api.example.com/api"), &defaults)
            .unwrap();
        assert_eq!(plain.tls, TlsVerification::SystemDefaults);
        assert_eq!(plain.timeout, Duration::from_secs(30));

        let mut custom = profile("http://localhost:5000/api");
        custom.ca_cert = Some(PathBuf::from("/etc/ca.pem"));
        custom.timeout = Some(3);
        let cfg = profile_to_client_config(&custom, &defaults).unwrap();
        assert_eq!(cfg.tls, TlsVerification::CustomCa(PathBuf::from("/etc/ca.pem")));
        assert_eq!(cfg.timeout, Duration::from_secs(3));

        custom.insecure = Some(true);
        let cfg = profile_to_client_config(&custom, &defaults).unwrap();
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn rejects_bad_api_urls() {
        let defaults = Defaults::default();
        for bad in ["not a url", "ftp://example.com/api"] {
            let err = profile_to_client_config(&profile(bad), &defaults).unwrap_err();
            assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "api_url"));
        }
    }

    #[test]
    fn session_path_is_per_profile() {
        let a = session_path("default");
        let b = session_path("staging");
        assert_ne!(a, b);
        assert!(b.ends_with("sessions/staging.json"));
    }
}
