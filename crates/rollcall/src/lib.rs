//! `rollcall` - a chat-driven attendance tracker core
//!
//! This library owns the roster (groups of named members), the per-day
//! presence records, their durable persistence, and report generation. The
//! presentation layer that drives it (the bundled CLI, or a chat frontend)
//! stays thin: it relays the operations and messages defined here.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod persist;
pub mod report;
pub mod roster;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use report::{ReportBuilder, ReportRow, ReportTable};
pub use roster::{Roster, RosterStatus};
pub use store::{AttendanceRecord, AttendanceStore, PurgeOutcome};
