//! Command dispatch: bridges CLI args -> backoffice operations -> output.

pub mod auth;
pub mod config_cmd;
pub mod resources;
pub mod routes;
pub mod util;

use backoffice_core::{Backoffice, Blog, BusinessEvent, Education, Job};

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    backoffice: &Backoffice,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(backoffice, args, resolved, global).await,
        Command::Logout => auth::logout(backoffice, global),
        Command::Status => auth::status(backoffice, resolved, global),
        Command::Blogs(args) => {
            resources::handle::<Blog>(backoffice, args.command.into(), resolved, global).await
        }
        Command::Educations(args) => {
            resources::handle::<Education>(backoffice, args.command.into(), resolved, global).await
        }
        Command::Jobs(args) => {
            resources::handle::<Job>(backoffice, args.command.into(), resolved, global).await
        }
        Command::Events(args) => {
            resources::handle::<BusinessEvent>(backoffice, args.command.into(), resolved, global)
                .await
        }
        // Handled before a backend is built
        Command::Config(_) | Command::Completions(_) | Command::Routes => Ok(()),
    }
}
