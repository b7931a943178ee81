//! CLI-aware wrappers over `backoffice_config`: apply global flag
//! overrides and decide which session scopes an invocation uses.
//!
//! Core never sees these types -- it receives a pre-built `ClientConfig`
//! and `SessionStore`.

use std::time::Duration;

use secrecy::SecretString;

use backoffice_config::{self as cfg, Config, Profile};
use backoffice_core::{ClientConfig, FileStorage, MemoryStorage, SessionStore, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use backoffice_config::{config_path, load_config, load_config_or_default, save_config};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Everything a backend-bound command needs.
pub struct Resolved {
    pub profile_name: String,
    pub client: ClientConfig,
    pub email: Option<String>,
    pub password: Option<SecretString>,
}

/// Translate the active profile + global flags into a `ClientConfig`.
///
/// This is the single boundary where CLI config types cross into core
/// types. Without a profile, `--api-url` alone is enough.
pub fn resolve(global: &GlobalOpts, config: &Config) -> Result<Resolved, CliError> {
    let profile_name = active_profile_name(global, config);

    let Some(profile) = config.profiles.get(&profile_name) else {
        if global.profile.is_some() {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(config),
            });
        }
        return resolve_without_profile(global, config, profile_name);
    };

    let mut client = cfg::profile_to_client_config(profile, &config.defaults)?;

    // 1. API URL (flag > env > profile)
    if let Some(ref url) = global.api_url {
        client.api_url = cfg::parse_api_url(url)?;
    }

    // 2. TLS verification
    if global.insecure {
        client.tls = TlsVerification::DangerAcceptInvalid;
    }

    // 3. Timeout
    if let Some(secs) = global.timeout {
        client.timeout = Duration::from_secs(secs);
    }

    Ok(Resolved {
        password: cfg::resolve_password(profile, &profile_name),
        email: profile.email.clone(),
        profile_name,
        client,
    })
}

fn resolve_without_profile(
    global: &GlobalOpts,
    config: &Config,
    profile_name: String,
) -> Result<Resolved, CliError> {
    let url = global.api_url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;

    let mut client = ClientConfig::new(cfg::parse_api_url(url)?);
    if global.insecure || config.defaults.insecure {
        client.tls = TlsVerification::DangerAcceptInvalid;
    }
    client.timeout = Duration::from_secs(global.timeout.unwrap_or(config.defaults.timeout));

    Ok(Resolved {
        profile_name,
        client,
        email: None,
        password: std::env::var("BACKOFFICE_PASSWORD")
            .ok()
            .map(SecretString::from),
    })
}

/// Session scopes for this invocation.
///
/// `--token` gives a memory-only session; otherwise the profile's
/// persistent scope (session file by default) backs the store.
pub fn session_store(global: &GlobalOpts, config: &Config, profile_name: &str) -> SessionStore {
    if let Some(ref token) = global.token {
        return SessionStore::ephemeral(&SecretString::from(token.clone()));
    }
    match config.profiles.get(profile_name) {
        Some(profile) => cfg::session_store(profile, profile_name),
        None => SessionStore::new(
            FileStorage::new(cfg::session_path(profile_name)),
            MemoryStorage::new(),
        ),
    }
}

/// Comma-separated profile names, or "(none)".
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// A new profile with only the API URL set.
pub fn empty_profile(api_url: String) -> Profile {
    Profile {
        api_url,
        email: None,
        password_env: None,
        session: cfg::SessionBackend::default(),
        ca_cert: None,
        insecure: None,
        timeout: None,
    }
}
