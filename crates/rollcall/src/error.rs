//! Error types for rollcall.
//!
//! This module defines all error types used throughout the rollcall crate.
//! Most errors are relayed verbatim to the operator by the presentation
//! layer, so the display texts are written as user-facing messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for rollcall operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Roster Errors ===
    /// The roster file is missing one or both required columns.
    #[error("roster file must contain the columns '{group_column}' and '{member_column}'")]
    RosterSchema {
        /// Configured name of the group column.
        group_column: String,
        /// Configured name of the member column.
        member_column: String,
    },

    /// A required roster cell is empty.
    #[error("roster file has an empty cell in a required column (row {row})")]
    RosterData {
        /// 1-based row number in the file, counting the header as row 1.
        row: usize,
    },

    /// The roster file is in a format the loader cannot read.
    #[error("cannot read '.{extension}' files; export the roster as CSV and import that instead")]
    RosterFormat {
        /// Lowercased file extension.
        extension: String,
    },

    /// Reading or parsing the roster file failed.
    #[error("failed to read roster file {path}: {source}")]
    RosterRead {
        /// Path to the roster file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: csv::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Persistence Errors ===
    /// Writing the attendance file failed.
    #[error("failed to write attendance data to {path}: {source}")]
    AttendanceWrite {
        /// Path to the attendance file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Report Errors ===
    /// The requested report range is out of bounds.
    #[error("report day count must be between 1 and {max}, got {days}")]
    ReportDays {
        /// The requested day count.
        days: u32,
        /// The configured upper bound.
        max: u32,
    },

    /// Writing the report artifact failed.
    #[error("failed to write report to {path}: {source}")]
    ReportWrite {
        /// Path to the report artifact.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: csv::Error,
    },

    /// No roster has been loaded, so there is nothing to report on.
    #[error("no groups loaded; import a roster first")]
    EmptyRoster,

    /// No attendance was recorded for the requested period.
    #[error("no attendance recorded for the requested period")]
    NoData,

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for rollcall operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create a roster format error for an unreadable file extension.
    #[must_use]
    pub fn roster_format(extension: impl Into<String>) -> Self {
        Self::RosterFormat {
            extension: extension.into(),
        }
    }

    /// Check if this error is one of the "nothing to report" conditions.
    ///
    /// These are expected user-facing outcomes, not failures: the
    /// presentation layer relays the message instead of aborting.
    #[must_use]
    pub fn is_nothing_to_report(&self) -> bool {
        matches!(self, Self::EmptyRoster | Self::NoData)
    }

    /// Check if this error originated from roster input validation.
    #[must_use]
    pub fn is_roster_error(&self) -> bool {
        matches!(
            self,
            Self::RosterSchema { .. }
                | Self::RosterData { .. }
                | Self::RosterFormat { .. }
                | Self::RosterRead { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_schema_display() {
        let err = Error::RosterSchema {
            group_column: "group".to_string(),
            member_column: "member".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'group'"));
        assert!(msg.contains("'member'"));
    }

    #[test]
    fn test_roster_data_display() {
        let err = Error::RosterData { row: 7 };
        assert!(err.to_string().contains("row 7"));
    }

    #[test]
    fn test_roster_format_display() {
        let err = Error::roster_format("xlsx");
        let msg = err.to_string();
        assert!(msg.contains(".xlsx"));
        assert!(msg.contains("CSV"));
    }

    #[test]
    fn test_config_validation_display() {
        let err = Error::config_validation("max_days must be at least 1");
        assert!(err.to_string().contains("max_days"));
    }

    #[test]
    fn test_report_days_display() {
        let err = Error::ReportDays { days: 500, max: 365 };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("365"));
    }

    #[test]
    fn test_empty_roster_display() {
        let err = Error::EmptyRoster;
        assert_eq!(err.to_string(), "no groups loaded; import a roster first");
    }

    #[test]
    fn test_no_data_display() {
        let err = Error::NoData;
        assert_eq!(
            err.to_string(),
            "no attendance recorded for the requested period"
        );
    }

    #[test]
    fn test_is_nothing_to_report() {
        assert!(Error::EmptyRoster.is_nothing_to_report());
        assert!(Error::NoData.is_nothing_to_report());
        assert!(!Error::RosterData { row: 2 }.is_nothing_to_report());
        assert!(!Error::ReportDays { days: 0, max: 365 }.is_nothing_to_report());
    }

    #[test]
    fn test_is_roster_error() {
        assert!(Error::RosterData { row: 2 }.is_roster_error());
        assert!(Error::roster_format("ods").is_roster_error());
        assert!(!Error::NoData.is_roster_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_attendance_write_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::AttendanceWrite {
            path: PathBuf::from("/data/attendance.json"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/attendance.json"));
    }

    #[test]
    fn test_directory_create_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
