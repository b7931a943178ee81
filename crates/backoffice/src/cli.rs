//! Clap derive structures for the `backoffice` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// backoffice -- admin console for the consulting site's content
#[derive(Debug, Parser)]
#[command(
    name = "backoffice",
    version,
    about = "Manage the consulting site's blogs, programmes, jobs, and events",
    long_about = "Admin console for the consulting site's content back-office.\n\n\
        Log in once per profile; every admin command runs behind the same\n\
        session guard as the web admin area.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "BACKOFFICE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API root URL (overrides profile)
    #[arg(long, env = "BACKOFFICE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Session token for this invocation only (stored session is untouched)
    #[arg(long, env = "BACKOFFICE_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BACKOFFICE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "BACKOFFICE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "BACKOFFICE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session for the active profile
    Login(LoginArgs),

    /// Clear the stored session
    Logout,

    /// Show the active profile and session state
    Status,

    /// Manage blog posts
    #[command(alias = "blog")]
    Blogs(BlogsArgs),

    /// Manage education programmes
    #[command(alias = "edu")]
    Educations(EducationsArgs),

    /// Manage job openings
    #[command(alias = "job")]
    Jobs(JobsArgs),

    /// Manage business events
    #[command(alias = "ev")]
    Events(EventsArgs),

    /// Show the site's route map and what the session guard allows
    Routes,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

/// Pagination and filtering arguments for list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(long)]
    pub page: Option<u32>,

    /// Items per page
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,

    /// Free-text search
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Category filter
    #[arg(long)]
    pub category: Option<String>,
}

/// Load a create payload from a JSON file instead of field flags.
#[derive(Debug, Args)]
pub struct FromFileArg {
    /// JSON file with the full create payload
    #[arg(long, short = 'F', value_name = "PATH")]
    pub from_file: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOGIN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Admin email (defaults to the profile's email, then prompts)
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  BLOGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct BlogsArgs {
    #[command(subcommand)]
    pub command: BlogsCommand,
}

#[derive(Debug, Subcommand)]
pub enum BlogsCommand {
    /// List blog posts
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one blog post
    Get {
        /// Blog ID
        id: String,
    },

    /// Publish a blog post
    Create(BlogCreateArgs),

    /// Delete a blog post
    #[command(alias = "rm")]
    Delete {
        /// Blog ID
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct BlogCreateArgs {
    #[command(flatten)]
    pub file: FromFileArg,

    /// Post title
    #[arg(long, required_unless_present = "from_file", conflicts_with = "from_file")]
    pub title: Option<String>,

    /// Post body
    #[arg(long, default_value = "")]
    pub content: String,

    /// Category
    #[arg(long, default_value = "")]
    pub category: String,

    /// Cover image URL
    #[arg(long)]
    pub image: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EDUCATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EducationsArgs {
    #[command(subcommand)]
    pub command: EducationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EducationsCommand {
    /// List education programmes
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one education programme
    Get {
        /// Programme ID
        id: String,
    },

    /// Add an education programme
    Create(EducationCreateArgs),

    /// Delete an education programme
    #[command(alias = "rm")]
    Delete {
        /// Programme ID
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct EducationCreateArgs {
    #[command(flatten)]
    pub file: FromFileArg,

    /// Programme title
    #[arg(long, required_unless_present = "from_file", conflicts_with = "from_file")]
    pub title: Option<String>,

    /// Programme description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Destination country
    #[arg(long)]
    pub country: Option<String>,

    /// Institution name
    #[arg(long)]
    pub institution: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  JOBS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct JobsArgs {
    #[command(subcommand)]
    pub command: JobsCommand,
}

#[derive(Debug, Subcommand)]
pub enum JobsCommand {
    /// List job openings
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one job opening
    Get {
        /// Job ID
        id: String,
    },

    /// Post a job opening
    Create(JobCreateArgs),

    /// Delete a job opening
    #[command(alias = "rm")]
    Delete {
        /// Job ID
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct JobCreateArgs {
    #[command(flatten)]
    pub file: FromFileArg,

    /// Job title
    #[arg(long, required_unless_present = "from_file", conflicts_with = "from_file")]
    pub title: Option<String>,

    /// Job description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Hiring company
    #[arg(long)]
    pub company: Option<String>,

    /// Work location
    #[arg(long)]
    pub location: Option<String>,

    /// Employment type (e.g. "full-time", "contract")
    #[arg(long = "type", value_name = "TYPE")]
    pub employment_type: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  EVENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub command: EventsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EventsCommand {
    /// List business events
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one business event
    Get {
        /// Event ID
        id: String,
    },

    /// Announce a business event
    Create(EventCreateArgs),

    /// Delete a business event
    #[command(alias = "rm")]
    Delete {
        /// Event ID
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct EventCreateArgs {
    #[command(flatten)]
    pub file: FromFileArg,

    /// Event title
    #[arg(long, required_unless_present = "from_file", conflicts_with = "from_file")]
    pub title: Option<String>,

    /// Event description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Venue
    #[arg(long)]
    pub venue: Option<String>,

    /// Start time (RFC 3339, e.g. 2025-03-01T18:00:00Z)
    #[arg(long)]
    pub date: Option<DateTime<Utc>>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (api_url, email, password_env, session, insecure, timeout, ca_cert)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the admin password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
