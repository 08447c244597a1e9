//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Database connection string, overrides the configuration
    #[arg(long, value_name = "URL", global = true)]
    pub database_url: Option<String>,

    /// Migration directory or file:// URI, overrides the configuration
    #[arg(long, value_name = "PATH", global = true)]
    pub source: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations
    Up {
        /// Number of migrations to apply, negative for all [default: -1]
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        steps: Option<i64>,
    },

    /// Revert applied migrations
    Down {
        /// Number of migrations to revert, negative for all [default: 1]
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        steps: Option<i64>,
    },

    /// Drop every table of a test or demo database
    Reset,

    /// Show the current schema version
    Version,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Generate a sample configuration file
    Generate {
        /// Output file path
        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}
