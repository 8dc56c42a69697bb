//! `rollcall` - CLI for the attendance tracker
//!
//! This binary is the presentation layer: it relays operator commands into
//! the attendance core and prints the core's messages. Completing a mutating
//! command doubles as the save confirmation, so the handlers persist before
//! reporting back.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use chrono::{Local, NaiveDate};
use clap::Parser;

use rollcall::cli::{Cli, Command, ConfigCommand, DayCommand, MarkCommand, ReportCommand, RosterCommand};
use rollcall::{init_logging, roster, AttendanceStore, Config, Error, ReportBuilder};

/// Marker shown next to present members.
const CHECK_MARK: &str = "\u{2705}";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Roster(roster_cmd) => handle_roster(&config, &roster_cmd),
        Command::Mark(mark_cmd) => handle_mark(&config, &mark_cmd, true),
        Command::Unmark(mark_cmd) => handle_mark(&config, &mark_cmd, false),
        Command::Day(day_cmd) => handle_day(&config, &day_cmd),
        Command::Report(report_cmd) => handle_report(&config, &report_cmd),
        Command::Purge => handle_purge(&config),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

/// Load the configured roster and open the store backed by it.
fn open_store(config: &Config) -> Result<AttendanceStore, Box<dyn std::error::Error>> {
    let (roster, _) = roster::load(
        &config.roster_path(),
        &config.roster.group_column,
        &config.roster.member_column,
    )?;
    Ok(AttendanceStore::open(config.attendance_path(), roster))
}

fn handle_roster(
    config: &Config,
    cmd: &RosterCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        RosterCommand::Import { file } => {
            if !file.exists() {
                return Err(format!("roster file not found: {}", file.display()).into());
            }

            // Validate the source before it replaces the configured roster
            // file, so a rejected import leaves the previous roster intact.
            match roster::load(
                file,
                &config.roster.group_column,
                &config.roster.member_column,
            ) {
                Ok((_, status)) => {
                    let destination = config.roster_path();
                    if let Some(parent) = destination.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    if *file != destination {
                        std::fs::copy(file, &destination)?;
                    }
                    println!("{}", status.message());
                }
                Err(err) if err.is_roster_error() => println!("{err}"),
                Err(err) => return Err(err.into()),
            }
        }
        RosterCommand::Show => {
            let (roster, status) = roster::load(
                &config.roster_path(),
                &config.roster.group_column,
                &config.roster.member_column,
            )?;
            if roster.is_empty() {
                println!("{}", status.message());
            } else {
                for group in roster.group_names() {
                    println!("{group}");
                    for member in roster.members_of(group) {
                        println!("  {member}");
                    }
                }
            }
        }
    }
    Ok(())
}

fn handle_mark(
    config: &Config,
    cmd: &MarkCommand,
    present: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(config)?;
    let date = cmd.date.unwrap_or_else(|| Local::now().date_naive());

    for member in &cmd.members {
        if present {
            store.mark(date, &cmd.group, member);
        } else {
            store.unmark(date, &cmd.group, member);
        }
    }

    match store.persist() {
        Ok(()) => print_group_day(&store, date, &cmd.group),
        Err(err) => println!("Attendance was NOT saved: {err}"),
    }
    Ok(())
}

fn handle_day(config: &Config, cmd: &DayCommand) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config)?;
    let date = cmd.date.unwrap_or_else(|| Local::now().date_naive());
    print_group_day(&store, date, &cmd.group);
    Ok(())
}

/// Print a group's member list with presence markers, keyboard-style.
fn print_group_day(store: &AttendanceStore, date: NaiveDate, group: &str) {
    let members = store.members_of(group);
    if members.is_empty() {
        println!("Unknown group: {group}");
        return;
    }

    println!("{group} on {date}:");
    for member in members {
        if store.is_present(date, group, member) {
            println!("  {CHECK_MARK} {member}");
        } else {
            println!("     {member}");
        }
    }
}

fn handle_report(
    config: &Config,
    cmd: &ReportCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config)?;
    let builder = ReportBuilder::from_config(config);

    match builder.generate(&store, cmd.days) {
        Ok(path) => println!("Report written to {}", path.display()),
        // "Nothing to report" and an out-of-range day count are operator
        // messages, not failures
        Err(err) if err.is_nothing_to_report() => println!("{err}"),
        Err(err @ Error::ReportDays { .. }) => println!("{err}"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn handle_purge(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(config)?;

    let outcome = store.purge_stale();
    if outcome.is_empty() {
        println!("No stale attendance entries to purge.");
        return Ok(());
    }

    match store.persist() {
        Ok(()) => println!(
            "Purged {} stale group branch(es) and {} stale member name(s).",
            outcome.groups_removed, outcome.members_removed
        ),
        Err(err) => println!("Purge was NOT saved: {err}"),
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Data dir:        {}", config.data_dir().display());
                println!("  Roster file:     {}", config.roster_path().display());
                println!("  Attendance file: {}", config.attendance_path().display());
                println!("  Reports dir:     {}", config.reports_dir().display());
                println!();
                println!("[Roster]");
                println!("  Group column:    {}", config.roster.group_column);
                println!("  Member column:   {}", config.roster.member_column);
                println!();
                println!("[Report]");
                println!("  Max days:        {}", config.report.max_days);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
