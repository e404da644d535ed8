//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    auth::{LoginArgs, UnlockArgs},
    collab::CollabCommands,
    cred::CredCommands,
    equip::EquipCommands,
    export::ExportArgs,
    init::InitArgs,
    license::LicenseCommands,
    maint::MaintCommands,
    report::ReportCommands,
    user::UserCommands,
};

#[derive(Parser)]
#[command(name = "itam")]
#[command(author, version, about = "IT asset inventory console")]
#[command(long_about = "Track equipment, collaborators, software licenses, credentials and maintenance tickets for several companies, with an audit trail for every equipment change.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root (default: auto-detect by finding .itam/)
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Company to operate on (default: `default_company` from config)
    #[arg(long, short = 'c', global = true)]
    pub company: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new inventory workspace
    Init(InitArgs),

    /// Log in with username and PIN
    Login(LoginArgs),

    /// End the current session
    Logout,

    /// Show the logged-in user and role
    Whoami,

    /// Unlock the console after inactivity
    Unlock(UnlockArgs),

    /// Equipment management
    #[command(subcommand)]
    Equip(EquipCommands),

    /// Collaborator management
    #[command(subcommand)]
    Collab(CollabCommands),

    /// Software license management
    #[command(subcommand)]
    License(LicenseCommands),

    /// Maintenance tickets
    #[command(subcommand)]
    Maint(MaintCommands),

    /// Credential vault
    #[command(subcommand)]
    Cred(CredCommands),

    /// Console user management
    #[command(subcommand)]
    User(UserCommands),

    /// Write a full JSON backup of the database
    Export(ExportArgs),

    /// Generate CSV reports and handover documents
    #[command(subcommand)]
    Report(ReportCommands),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (table for list, details for show)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
