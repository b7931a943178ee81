//! Config subcommand handlers.

use dialoguer::{Input, Select};

use backoffice_config::{Config, Profile, SessionBackend};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

const VALID_KEYS: &str = "api_url, email, password_env, session, insecure, timeout, ca_cert";

/// Apply `key = value` to a profile.
fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "api_url" | "api-url" => {
            backoffice_config::parse_api_url(&value)?;
            profile.api_url = value;
        }
        "email" => profile.email = Some(value),
        "password_env" | "password-env" => profile.password_env = Some(value),
        "session" => {
            profile.session = match value.as_str() {
                "file" => SessionBackend::File,
                "keyring" => SessionBackend::Keyring,
                _ => {
                    return Err(CliError::Validation {
                        field: "session".into(),
                        reason: "must be 'file' or 'keyring'".into(),
                    });
                }
            };
        }
        "insecure" => {
            profile.insecure = Some(value.parse().map_err(|_| CliError::Validation {
                field: "insecure".into(),
                reason: "must be 'true' or 'false'".into(),
            })?);
        }
        "timeout" => {
            profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                field: "timeout".into(),
                reason: "must be a number (seconds)".into(),
            })?);
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!("unknown config key '{other}'. Valid keys: {VALID_KEYS}"),
            });
        }
    }
    Ok(())
}

fn require_profile<'a>(cfg: &'a Config, name: &str) -> Result<&'a Profile, CliError> {
    cfg.profiles
        .get(name)
        .ok_or_else(|| CliError::ProfileNotFound {
            name: name.to_owned(),
            available: config::available_profiles(cfg),
        })
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => {
                    toml::to_string_pretty(&cfg).map_err(|e| CliError::Config {
                        message: e.to_string(),
                    })?
                }
                _ => output::render_single(&global.output, &cfg, |_| String::new(), |_| {
                    String::new()
                })?,
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(|| config::empty_profile(String::new()));
            set_key(profile, &key, value)?;

            config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: backoffice config init");
                return Ok(());
            }
            let mut names: Vec<_> = cfg.profiles.keys().collect();
            names.sort();
            for name in names {
                let marker = if name == default { " *" } else { "" };
                println!("{name}{marker}");
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            require_profile(&cfg, &name)?;
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config()?;
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            require_profile(&cfg, &profile_name)?;

            let secret = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            backoffice_config::store_password(&profile_name, &secret)?;

            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    let mut cfg = config::load_config()?;
    eprintln!("Back-office CLI configuration");
    eprintln!("   Config path: {}\n", config_path.display());

    // 1. Profile name
    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    // 2. API URL
    let api_url: String = Input::new()
        .with_prompt("API URL")
        .default("http://localhost:5000/api".into())
        .validate_with(|input: &String| {
            backoffice_config::parse_api_url(input)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    // 3. Admin email
    let email: String = Input::new()
        .with_prompt("Admin email (optional)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;

    // 4. Session backend
    let session_choices = &[
        "Session file in the data directory (default)",
        "System keyring",
    ];
    let session = match Select::new()
        .with_prompt("Where to keep the login session?")
        .items(session_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?
    {
        0 => SessionBackend::File,
        _ => SessionBackend::Keyring,
    };

    // 5. Optional password in the keyring
    let store = Select::new()
        .with_prompt("Store the admin password in the system keyring?")
        .items(&["No, prompt at login", "Yes"])
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    if store == 1 {
        let pass = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
        if pass.is_empty() {
            return Err(CliError::Validation {
                field: "password".into(),
                reason: "password cannot be empty".into(),
            });
        }
        backoffice_config::store_password(&profile_name, &pass)?;
        eprintln!("   ✓ Password stored in system keyring");
    }

    // 6. Merge into the existing config
    let mut profile = config::empty_profile(api_url);
    profile.email = Some(email).filter(|e| !e.trim().is_empty());
    profile.session = session;

    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Next: backoffice login");
    Ok(())
}
