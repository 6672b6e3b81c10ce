//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Plannerd - conversational event planning orchestrator
#[derive(Parser)]
#[command(
    name = "pd",
    about = "Multi-agent event planning copilot",
    version,
    after_help = "Logs are written to: ~/.local/share/plannerd/logs/plannerd.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// List the agent catalog
    Agents,

    /// Start an interactive planning session
    Chat {
        /// Session name (used in the session id)
        #[arg(default_value = "planning")]
        name: String,
    },
}

/// Path of the log file `setup_logging` writes to
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("plannerd")
        .join("logs")
        .join("plannerd.log")
}
