//! Roster loading and membership queries.
//!
//! The roster is a mapping from group name to the group's member names. It is
//! rebuilt wholesale from a CSV file on each import; there is no incremental
//! patching and no versioning of previous rosters.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{Error, Result};

/// Spreadsheet extensions the CSV loader cannot read.
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls", "ods"];

/// The current group → members mapping.
///
/// Group names are unique and non-empty; member lists are sorted
/// lexicographically and deduplicated. The ordering of both
/// [`group_names`](Roster::group_names) and [`members_of`](Roster::members_of)
/// is stable for a given roster, so a presentation layer may cache positional
/// indices until the roster is replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    groups: BTreeMap<String, Vec<String>>,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from (group, member) rows.
    ///
    /// Cells are trimmed; rows where either trimmed value is empty are
    /// dropped. Members are grouped in encounter order, then each group's
    /// list is sorted and deduplicated.
    #[must_use]
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (group, member) in rows {
            let group = group.trim();
            let member = member.trim();
            if group.is_empty() || member.is_empty() {
                continue;
            }
            groups
                .entry(group.to_string())
                .or_default()
                .push(member.to_string());
        }

        for members in groups.values_mut() {
            members.sort();
            members.dedup();
        }

        Self { groups }
    }

    /// Get all group names, lexicographically sorted.
    #[must_use]
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    /// Get the members of a group, sorted.
    ///
    /// Returns an empty slice for unknown groups.
    #[must_use]
    pub fn members_of(&self, group: &str) -> &[String] {
        self.groups.get(group).map_or(&[], Vec::as_slice)
    }

    /// Check if a group exists in the roster.
    #[must_use]
    pub fn contains_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    /// Check if a member belongs to a group.
    #[must_use]
    pub fn contains(&self, group: &str, member: &str) -> bool {
        self.groups.get(group).is_some_and(|members| {
            members
                .binary_search_by(|m| m.as_str().cmp(member))
                .is_ok()
        })
    }

    /// Check if the roster has no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of groups in the roster.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of members across all groups.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Outcome of a roster load, for relaying to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterStatus {
    /// The roster file was parsed successfully.
    Loaded {
        /// Number of groups found.
        groups: usize,
    },
    /// No roster file exists yet; this is the first-run state, not an error.
    FileMissing,
}

impl RosterStatus {
    /// Human-readable status message for the presentation layer.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Loaded { groups } => {
                format!("Roster loaded: found {groups} group(s).")
            }
            Self::FileMissing => "No roster file has been imported yet.".to_string(),
        }
    }
}

/// Load a roster from a CSV file with the given required column names.
///
/// Validation order:
/// 1. A missing file is not an error: it yields an empty roster with
///    [`RosterStatus::FileMissing`].
/// 2. Binary spreadsheet extensions are rejected with a message asking the
///    operator to re-export as CSV.
/// 3. Both required columns must be present in the header row.
/// 4. No required cell may be empty in the raw file; whitespace-only cells
///    pass this check but their rows are dropped after trimming.
///
/// # Errors
///
/// Returns [`Error::RosterFormat`], [`Error::RosterSchema`],
/// [`Error::RosterData`], or [`Error::RosterRead`]. On any error the caller's
/// existing roster is left untouched (this function never mutates state).
pub fn load(path: &Path, group_column: &str, member_column: &str) -> Result<(Roster, RosterStatus)> {
    if !path.exists() {
        warn!(
            "Roster file not found at {}; starting with an empty roster",
            path.display()
        );
        return Ok((Roster::new(), RosterStatus::FileMissing));
    }

    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        let extension = extension.to_ascii_lowercase();
        if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
            return Err(Error::roster_format(extension));
        }
    }

    // Flexible: rows shorter than the header surface as empty required
    // cells below instead of a record-length parse error
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| Error::RosterRead {
            path: path.to_path_buf(),
            source,
        })?;

    let headers = reader
        .headers()
        .map_err(|source| Error::RosterRead {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let group_idx = headers.iter().position(|h| h.trim() == group_column);
    let member_idx = headers.iter().position(|h| h.trim() == member_column);
    let (Some(group_idx), Some(member_idx)) = (group_idx, member_idx) else {
        return Err(Error::RosterSchema {
            group_column: group_column.to_string(),
            member_column: member_column.to_string(),
        });
    };

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|source| Error::RosterRead {
            path: path.to_path_buf(),
            source,
        })?;
        // 1-based file row, counting the header as row 1
        let row = index + 2;
        let group = record.get(group_idx).unwrap_or("");
        let member = record.get(member_idx).unwrap_or("");
        if group.is_empty() || member.is_empty() {
            return Err(Error::RosterData { row });
        }
        rows.push((group.to_string(), member.to_string()));
    }

    let roster = Roster::from_rows(rows);
    info!(
        "Loaded roster from {}: {} group(s), {} member(s)",
        path.display(),
        roster.group_count(),
        roster.member_count()
    );
    let status = RosterStatus::Loaded {
        groups: roster.group_count(),
    };
    Ok((roster, status))
}
