//! Session commands: login, logout, status.

use std::io::BufRead;

use dialoguer::Input;
use secrecy::SecretString;
use serde::Serialize;

use backoffice_core::{Backoffice, Credentials, Guarded, Route};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

pub async fn login(
    backoffice: &Backoffice,
    args: LoginArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let email = match args.email.or_else(|| resolved.email.clone()) {
        Some(email) => email,
        None => Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(prompt_err)?,
    };
    if email.trim().is_empty() {
        return Err(CliError::Validation {
            field: "email".into(),
            reason: "email cannot be empty".into(),
        });
    }

    let password = if args.password_stdin {
        read_password_stdin()?
    } else if let Some(ref password) = resolved.password {
        password.clone()
    } else {
        rpassword::prompt_password("Password: ")
            .map(SecretString::from)
            .map_err(prompt_err)?
    };

    let notice = backoffice
        .login(&Credentials {
            email: email.trim().to_owned(),
            password,
        })
        .await?;

    if notice.is_error() {
        return Err(CliError::LoginRejected {
            message: notice.message().to_owned(),
        });
    }

    if !global.quiet {
        let color = output::should_color(&global.color);
        eprintln!("{}", output::success_line(notice.message(), color));
        eprintln!("  {}", output::dim(&format!("→ {}", Route::AFTER_LOGIN), color));
    }
    Ok(())
}

fn read_password_stdin() -> Result<SecretString, CliError> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "no password on stdin".into(),
        });
    }
    Ok(SecretString::from(password.to_owned()))
}

pub fn logout(backoffice: &Backoffice, global: &GlobalOpts) -> Result<(), CliError> {
    let next = backoffice.logout()?;
    if !global.quiet {
        let color = output::should_color(&global.color);
        eprintln!("{}", output::success_line("Logged out", color));
        eprintln!("  {}", output::dim(&format!("→ {next}"), color));
    }
    Ok(())
}

#[derive(Serialize)]
struct StatusView {
    profile: String,
    api_url: String,
    authenticated: bool,
    admin_route: String,
}

pub fn status(
    backoffice: &Backoffice,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let admin_route = match backoffice.enter(Route::AFTER_LOGIN) {
        Guarded::Mounted(route) | Guarded::Redirect(route) => route.path().to_owned(),
        Guarded::Loading => "(resolving)".into(),
    };
    let view = StatusView {
        profile: resolved.profile_name.clone(),
        api_url: backoffice.api().base_url().to_string(),
        authenticated: backoffice.auth().is_authenticated(),
        admin_route,
    };

    let out = output::render_single(
        &global.output,
        &view,
        |v| {
            output::detail(&[
                ("Profile", v.profile.clone()),
                ("API", v.api_url.clone()),
                (
                    "Session",
                    if v.authenticated {
                        "logged in".into()
                    } else {
                        "logged out".into()
                    },
                ),
                ("Admin", v.admin_route.clone()),
            ])
        },
        |v| v.authenticated.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
