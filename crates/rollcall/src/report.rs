//! Attendance report generation.
//!
//! A report covers the N consecutive calendar dates ending today and is
//! written as a CSV artifact: one row per (group, member) pair in the
//! current roster, one column per date that actually has somebody marked
//! present. Dates where nothing was recorded, or where every present set is
//! empty, are left out to keep the report compact.

use std::path::{Path, PathBuf};

use chrono::{Duration, Local, NaiveDate};
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::AttendanceStore;

/// One report row: a roster member with one presence flag per report date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// The member's group.
    pub group: String,
    /// The member's name.
    pub member: String,
    /// Presence per date, aligned with [`ReportTable::dates`].
    pub present: Vec<bool>,
}

/// The in-memory presence matrix a report is rendered from.
///
/// Ephemeral: recomputed on every report request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    /// The surviving dates, sorted ascending.
    pub dates: Vec<NaiveDate>,
    /// One row per (group, member) pair, grouped by group then member.
    pub rows: Vec<ReportRow>,
}

/// Builds attendance report artifacts.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    /// Directory the artifacts are written to.
    reports_dir: PathBuf,
    /// Upper bound on the day count.
    max_days: u32,
    /// Header for the group column.
    group_header: String,
    /// Header for the member column.
    member_header: String,
}

impl ReportBuilder {
    /// Create a builder with explicit settings.
    #[must_use]
    pub fn new(
        reports_dir: impl Into<PathBuf>,
        max_days: u32,
        group_header: impl Into<String>,
        member_header: impl Into<String>,
    ) -> Self {
        Self {
            reports_dir: reports_dir.into(),
            max_days,
            group_header: group_header.into(),
            member_header: member_header.into(),
        }
    }

    /// Create a builder from the application configuration.
    ///
    /// The artifact reuses the configured roster column names as headers, so
    /// a generated report can itself be re-imported as a roster template.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.reports_dir(),
            config.report.max_days,
            config.roster.group_column.clone(),
            config.roster.member_column.clone(),
        )
    }

    /// Build the presence matrix for the `days` dates ending `today`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReportDays`] for an out-of-range day count,
    /// [`Error::EmptyRoster`] when no groups are loaded, and
    /// [`Error::NoData`] when nothing was ever recorded or no date in the
    /// window has a non-empty present set.
    pub fn table_as_of(
        &self,
        store: &AttendanceStore,
        days: u32,
        today: NaiveDate,
    ) -> Result<ReportTable> {
        if days == 0 || days > self.max_days {
            return Err(Error::ReportDays {
                days,
                max: self.max_days,
            });
        }
        if store.roster().is_empty() {
            return Err(Error::EmptyRoster);
        }
        if store.record().is_empty() {
            info!("No attendance has been recorded yet; nothing to report");
            return Err(Error::NoData);
        }

        let start = today - Duration::days(i64::from(days) - 1);
        // BTreeMap iteration keeps the surviving dates sorted
        let dates: Vec<NaiveDate> = store
            .record()
            .iter()
            .filter(|(date, day)| {
                **date >= start && **date <= today && day.values().any(|set| !set.is_empty())
            })
            .map(|(date, _)| *date)
            .collect();

        if dates.is_empty() {
            info!("No non-empty attendance in the last {days} day(s); nothing to report");
            return Err(Error::NoData);
        }

        let mut rows = Vec::new();
        for group in store.group_names() {
            for member in store.members_of(group) {
                let present = dates
                    .iter()
                    .map(|date| store.is_present(*date, group, member))
                    .collect();
                rows.push(ReportRow {
                    group: group.to_string(),
                    member: member.clone(),
                    present,
                });
            }
        }

        Ok(ReportTable { dates, rows })
    }

    /// Generate a report artifact for the `days` dates ending today.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`table_as_of`](Self::table_as_of), plus
    /// I/O errors from writing the artifact.
    pub fn generate(&self, store: &AttendanceStore, days: u32) -> Result<PathBuf> {
        self.generate_as_of(store, days, Local::now().date_naive())
    }

    /// Generate a report artifact with a pinned "today".
    ///
    /// # Errors
    ///
    /// Same as [`generate`](Self::generate).
    pub fn generate_as_of(
        &self,
        store: &AttendanceStore,
        days: u32,
        today: NaiveDate,
    ) -> Result<PathBuf> {
        let table = self.table_as_of(store, days, today)?;
        self.write_artifact(&table, days, today)
    }

    /// Get the artifact path for a report generated on `today` over `days`.
    #[must_use]
    pub fn artifact_path(&self, days: u32, today: NaiveDate) -> PathBuf {
        let file_name = format!(
            "attendance_report_{}_last_{days}d.csv",
            today.format("%Y%m%d")
        );
        self.reports_dir.join(file_name)
    }

    /// Write the matrix to its CSV artifact and return the path.
    fn write_artifact(&self, table: &ReportTable, days: u32, today: NaiveDate) -> Result<PathBuf> {
        if !self.reports_dir.exists() {
            std::fs::create_dir_all(&self.reports_dir).map_err(|source| {
                Error::DirectoryCreate {
                    path: self.reports_dir.clone(),
                    source,
                }
            })?;
        }

        let path = self.artifact_path(days, today);
        let to_report_write = |source| Error::ReportWrite {
            path: path.clone(),
            source,
        };

        let mut writer = csv::Writer::from_path(&path).map_err(to_report_write)?;

        let mut header = vec![self.group_header.clone(), self.member_header.clone()];
        header.extend(table.dates.iter().map(ToString::to_string));
        writer.write_record(&header).map_err(to_report_write)?;

        for row in &table.rows {
            let mut cells = vec![row.group.clone(), row.member.clone()];
            cells.extend(
                row.present
                    .iter()
                    .map(|present| if *present { "1" } else { "0" }.to_string()),
            );
            writer.write_record(&cells).map_err(to_report_write)?;
        }
        writer.flush()?;

        info!(
            "Attendance report over {days} day(s) generated: {}",
            path.display()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Roster;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn test_roster() -> Roster {
        Roster::from_rows(vec![
            ("A".to_string(), "Alice".to_string()),
            ("A".to_string(), "Bob".to_string()),
            ("B".to_string(), "Zoe".to_string()),
        ])
    }

    fn test_store(name: &str, roster: Roster) -> AttendanceStore {
        let path = std::env::temp_dir().join(format!(
            "rollcall_report_{}_{}.json",
            std::process::id(),
            name
        ));
        let _ = std::fs::remove_file(&path);
        AttendanceStore::open(path, roster)
    }

    fn test_builder(name: &str) -> ReportBuilder {
        let dir = std::env::temp_dir().join(format!(
            "rollcall_report_{}_{}_out",
            std::process::id(),
            name
        ));
        ReportBuilder::new(dir, 365, "group", "member")
    }

    #[test]
    fn test_rejects_zero_days() {
        let builder = test_builder("zero");
        let store = test_store("zero", test_roster());

        let result = builder.table_as_of(&store, 0, date("2024-01-05"));
        assert!(matches!(result, Err(Error::ReportDays { days: 0, .. })));
    }

    #[test]
    fn test_rejects_days_over_bound() {
        let builder = test_builder("over");
        let store = test_store("over", test_roster());

        let result = builder.table_as_of(&store, 366, date("2024-01-05"));
        assert!(matches!(result, Err(Error::ReportDays { days: 366, max: 365 })));
    }

    #[test]
    fn test_empty_roster_error() {
        let builder = test_builder("no_roster");
        let store = test_store("no_roster", Roster::new());

        let result = builder.table_as_of(&store, 7, date("2024-01-05"));
        assert!(matches!(result, Err(Error::EmptyRoster)));
    }

    #[test]
    fn test_no_records_at_all_error() {
        let builder = test_builder("no_records");
        let store = test_store("no_records", test_roster());

        let result = builder.table_as_of(&store, 7, date("2024-01-05"));
        assert!(matches!(result, Err(Error::NoData)));
    }

    #[test]
    fn test_date_filtering() {
        // Records only on D1 and D3 within the window [D1..D5]:
        // output columns must be exactly {D1, D3}
        let builder = test_builder("filter");
        let mut store = test_store("filter", test_roster());

        store.mark(date("2024-01-01"), "A", "Alice");
        store.mark(date("2024-01-03"), "A", "Bob");

        let table = builder.table_as_of(&store, 5, date("2024-01-05")).unwrap();
        assert_eq!(table.dates, vec![date("2024-01-01"), date("2024-01-03")]);
    }

    #[test]
    fn test_records_outside_window_are_excluded() {
        let builder = test_builder("window");
        let mut store = test_store("window", test_roster());

        store.mark(date("2023-12-25"), "A", "Alice");
        store.mark(date("2024-01-05"), "A", "Bob");

        let table = builder.table_as_of(&store, 5, date("2024-01-05")).unwrap();
        assert_eq!(table.dates, vec![date("2024-01-05")]);
    }

    #[test]
    fn test_old_records_only_yields_no_data() {
        let builder = test_builder("old_only");
        let mut store = test_store("old_only", test_roster());

        store.mark(date("2023-12-25"), "A", "Alice");

        let result = builder.table_as_of(&store, 5, date("2024-01-05"));
        assert!(matches!(result, Err(Error::NoData)));
    }

    #[test]
    fn test_all_absent_day_yields_no_data() {
        // Mark then unmark leaves an empty "checked" set; an empty set does
        // not count as recorded for reporting purposes
        let builder = test_builder("all_absent");
        let mut store = test_store("all_absent", test_roster());

        let d = date("2024-01-01");
        store.mark(d, "A", "Alice");
        store.unmark(d, "A", "Alice");

        let result = builder.table_as_of(&store, 1, d);
        assert!(matches!(result, Err(Error::NoData)));
    }

    #[test]
    fn test_report_completeness() {
        // Every roster pair appears, even members never marked present
        let builder = test_builder("complete");
        let mut store = test_store("complete", test_roster());

        let d = date("2024-01-01");
        store.mark(d, "A", "Alice");

        let table = builder.table_as_of(&store, 1, d).unwrap();
        let pairs: Vec<(&str, &str)> = table
            .rows
            .iter()
            .map(|r| (r.group.as_str(), r.member.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("A", "Alice"), ("A", "Bob"), ("B", "Zoe")]
        );

        assert_eq!(table.rows[0].present, vec![true]);
        assert_eq!(table.rows[1].present, vec![false]); // all-false row
        assert_eq!(table.rows[2].present, vec![false]);
    }

    #[test]
    fn test_presence_is_per_group() {
        // Same member name in two groups must not leak across groups
        let roster = Roster::from_rows(vec![
            ("A".to_string(), "Alice".to_string()),
            ("B".to_string(), "Alice".to_string()),
        ]);
        let builder = test_builder("per_group");
        let mut store = test_store("per_group", roster);

        let d = date("2024-01-01");
        store.mark(d, "A", "Alice");

        let table = builder.table_as_of(&store, 1, d).unwrap();
        assert_eq!(table.rows[0].present, vec![true]); // A / Alice
        assert_eq!(table.rows[1].present, vec![false]); // B / Alice
    }

    #[test]
    fn test_generate_writes_artifact() {
        let builder = test_builder("artifact");
        let mut store = test_store("artifact", test_roster());

        let d = date("2024-01-05");
        store.mark(d, "A", "Alice");

        let path = builder.generate_as_of(&store, 7, d).unwrap();
        assert!(path.exists());
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "attendance_report_20240105_last_7d.csv"
        );

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers, vec!["group", "member", "2024-01-05"]);

        let records: Vec<csv::StringRecord> =
            reader.records().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(&records[0][0], "A");
        assert_eq!(&records[0][1], "Alice");
        assert_eq!(&records[0][2], "1");
        assert_eq!(&records[1][2], "0");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_generate_uses_configured_headers() {
        let dir = std::env::temp_dir().join(format!(
            "rollcall_report_{}_headers_out",
            std::process::id()
        ));
        let builder = ReportBuilder::new(dir, 365, "Class", "Pupil");
        let mut store = test_store("headers", test_roster());

        let d = date("2024-01-05");
        store.mark(d, "B", "Zoe");

        let path = builder.generate_as_of(&store, 1, d).unwrap();
        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers, vec!["Class", "Pupil", "2024-01-05"]);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_artifact_path_encoding() {
        let builder = ReportBuilder::new("/tmp/reports", 365, "group", "member");
        let path = builder.artifact_path(30, date("2024-02-29"));
        assert_eq!(
            path,
            PathBuf::from("/tmp/reports/attendance_report_20240229_last_30d.csv")
        );
    }

    #[test]
    fn test_nothing_to_report_errors_are_flagged() {
        let builder = test_builder("flags");
        let store = test_store("flags", Roster::new());

        let err = builder
            .table_as_of(&store, 7, date("2024-01-05"))
            .unwrap_err();
        assert!(err.is_nothing_to_report());
    }
}
