//! Configuration management for rollcall.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "rollcall";

/// Default roster file name.
const ROSTER_FILE_NAME: &str = "roster.csv";

/// Default attendance file name.
const ATTENDANCE_FILE_NAME: &str = "attendance.json";

/// Default reports directory name.
const REPORTS_DIR_NAME: &str = "reports";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ROLLCALL_`)
/// 2. TOML config file at `~/.config/rollcall/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Roster input configuration.
    pub roster: RosterConfig,
    /// Report configuration.
    pub report: ReportConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for all durable data.
    /// Defaults to `~/.local/share/rollcall`.
    pub data_dir: Option<PathBuf>,
    /// Path to the roster file.
    /// Defaults to `<data_dir>/roster.csv`.
    pub roster_file: Option<PathBuf>,
    /// Path to the attendance file.
    /// Defaults to `<data_dir>/attendance.json`.
    pub attendance_file: Option<PathBuf>,
    /// Directory for generated reports.
    /// Defaults to `<data_dir>/reports`.
    pub reports_dir: Option<PathBuf>,
}

/// Roster input configuration.
///
/// The roster file is a table with two required named columns; the column
/// names are configuration-supplied so an operator can import files produced
/// by someone else's spreadsheet template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Name of the column holding group names.
    pub group_column: String,
    /// Name of the column holding member names.
    pub member_column: String,
}

/// Report-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Maximum number of days a report may span.
    pub max_days: u32,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            group_column: "group".to_string(),
            member_column: "member".to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { max_days: 365 }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `ROLLCALL_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("ROLLCALL_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.roster.group_column.trim().is_empty() {
            return Err(Error::config_validation("group_column must not be empty"));
        }

        if self.roster.member_column.trim().is_empty() {
            return Err(Error::config_validation("member_column must not be empty"));
        }

        if self.roster.group_column == self.roster.member_column {
            return Err(Error::config_validation(format!(
                "group_column and member_column must differ, both are '{}'",
                self.roster.group_column
            )));
        }

        if self.report.max_days == 0 {
            return Err(Error::config_validation("max_days must be at least 1"));
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the roster file path, resolving defaults if not set.
    #[must_use]
    pub fn roster_path(&self) -> PathBuf {
        self.storage
            .roster_file
            .clone()
            .unwrap_or_else(|| self.data_dir().join(ROSTER_FILE_NAME))
    }

    /// Get the attendance file path, resolving defaults if not set.
    #[must_use]
    pub fn attendance_path(&self) -> PathBuf {
        self.storage
            .attendance_file
            .clone()
            .unwrap_or_else(|| self.data_dir().join(ATTENDANCE_FILE_NAME))
    }

    /// Get the reports directory, resolving defaults if not set.
    #[must_use]
    pub fn reports_dir(&self) -> PathBuf {
        self.storage
            .reports_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join(REPORTS_DIR_NAME))
    }
}
