//! Command-line interface for rollcall.
//!
//! This module provides the CLI structure for the `rollcall` binary. Each
//! invocation corresponds to one operator interaction with the tracker.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, DayCommand, MarkCommand, ReportCommand, RosterCommand};

/// rollcall - Track who showed up
///
/// Imports a roster of groups and members, records daily attendance, and
/// exports historical reports.
#[derive(Debug, Parser)]
#[command(name = "rollcall")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import or inspect the roster
    #[command(subcommand)]
    Roster(RosterCommand),

    /// Mark members present
    Mark(MarkCommand),

    /// Mark members absent
    Unmark(MarkCommand),

    /// Show who is marked present on a day
    Day(DayCommand),

    /// Generate an attendance report
    Report(ReportCommand),

    /// Delete attendance entries for groups and members no longer in the roster
    Purge,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
