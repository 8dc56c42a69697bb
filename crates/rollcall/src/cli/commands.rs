//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand};

/// Roster management commands.
#[derive(Debug, Subcommand)]
pub enum RosterCommand {
    /// Import a roster file, replacing the current roster
    Import {
        /// Path to a CSV file with the configured group and member columns
        file: PathBuf,
    },

    /// Show the current roster
    Show,
}

/// Arguments shared by the mark and unmark commands.
#[derive(Debug, Args)]
pub struct MarkCommand {
    /// The group to record attendance for
    pub group: String,

    /// Member names to record
    #[arg(required = true)]
    pub members: Vec<String>,

    /// The attendance date (defaults to today)
    #[arg(short, long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,
}

/// Day command arguments.
#[derive(Debug, Args)]
pub struct DayCommand {
    /// The group to show
    pub group: String,

    /// The attendance date (defaults to today)
    #[arg(short, long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,
}

/// Report command arguments.
#[derive(Debug, Args)]
pub struct ReportCommand {
    /// Number of days back from today to include
    #[arg(default_value = "7")]
    pub days: u32,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print the configuration file path
    Path,

    /// Validate a configuration file
    Validate {
        /// Path to the file to validate (defaults to the standard location)
        file: Option<PathBuf>,
    },
}
