use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "devsync", about = concat!("devsync v", env!("CARGO_PKG_VERSION"), " - keep your project portfolio in sync"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Apply changes to the local cache only, without contacting the server
    #[arg(long, global = true)]
    pub offline: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use a different DevSync home directory
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session token
    Login(LoginArgs),
    /// Create a new account
    Signup(SignupArgs),
    /// Forget the stored session and cached projects
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Replace the local projects with the server's
    Pull,
    /// List projects
    List(ViewArgs),
    /// Show project details
    Show(IdArgs),
    /// Add a project
    Add(AddArgs),
    /// Change fields of a project
    Edit(EditArgs),
    /// Delete a project
    Delete(IdArgs),
    /// Show dashboard statistics
    Stats,
    /// Export a project report (PDF or text)
    Export(ExportArgs),
    /// View or change configuration
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Account args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct LoginArgs {
    /// Account email
    pub email: String,
    /// Password (read from stdin when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct SignupArgs {
    /// Username to register
    pub username: String,
    /// Account email
    pub email: String,
    /// Password (read from stdin when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Project args
// ---------------------------------------------------------------------------

#[derive(Args, Default)]
pub struct ViewArgs {
    /// Only projects whose name contains this text (case-insensitive)
    #[arg(long, short)]
    pub search: Option<String>,
    /// Sort key: name, tech, status (default from config)
    #[arg(long)]
    pub sort: Option<String>,
}

#[derive(Args)]
pub struct IdArgs {
    /// Project ID (a unique prefix is enough)
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Project name
    pub name: String,
    /// Comma-separated tech stack
    #[arg(long, default_value = "")]
    pub tech: String,
    /// Status (planned, in-progress, completed)
    #[arg(long, default_value = "planned")]
    pub status: String,
    /// Description
    #[arg(long, short, default_value = "")]
    pub description: String,
    /// Hosted URL
    #[arg(long)]
    pub url: Option<String>,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Project ID (a unique prefix is enough)
    pub id: String,
    /// New name
    #[arg(long)]
    pub name: Option<String>,
    /// New comma-separated tech stack
    #[arg(long)]
    pub tech: Option<String>,
    /// New status (planned, in-progress, completed)
    #[arg(long)]
    pub status: Option<String>,
    /// New description
    #[arg(long, short)]
    pub description: Option<String>,
    /// New hosted URL (empty to clear)
    #[arg(long)]
    pub url: Option<String>,
    /// New start date (YYYY-MM-DD, empty to clear)
    #[arg(long)]
    pub start: Option<String>,
    /// New end date (YYYY-MM-DD, empty to clear)
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub view: ViewArgs,
    /// Output file (default from config, in the current directory)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Report format: pdf, text (default: from the output extension, else pdf)
    #[arg(long)]
    pub format: Option<String>,
}

// ---------------------------------------------------------------------------
// Config args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Set a configuration value
    Set {
        /// Dotted key, e.g. report.title
        key: String,
        value: String,
    },
}
