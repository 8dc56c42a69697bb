//! Durable persistence for attendance records.
//!
//! The on-disk format is a JSON document keyed by ISO calendar date, each
//! value mapping a group name to the sorted list of members marked present:
//!
//! ```json
//! { "2024-01-01": { "Red": ["Alice", "Bob"] } }
//! ```
//!
//! Saves always rewrite the whole document and go through a temp file in the
//! target directory followed by an atomic rename, so a crash mid-write never
//! leaves a torn file behind. Loads never fail: a missing file is the
//! first-run state and corrupt content degrades to an empty record.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use tempfile::NamedTempFile;
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::store::AttendanceRecord;

/// The serialized shape: ISO date → group → sorted member names.
type AttendanceDocument = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Save the full attendance record to `path`.
///
/// The parent directory is created if needed. Member sets are flattened to
/// sorted sequences, so the output is deterministic for a given record.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, the document cannot
/// be serialized, or the temp-file write/rename fails.
pub fn save(path: &Path, record: &AttendanceRecord) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let document = to_document(record);
    let bytes = serde_json::to_vec_pretty(&document)?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir).map_err(|source| Error::AttendanceWrite {
        path: path.to_path_buf(),
        source,
    })?;
    temp.write_all(&bytes)
        .map_err(|source| Error::AttendanceWrite {
            path: path.to_path_buf(),
            source,
        })?;
    temp.as_file()
        .sync_all()
        .map_err(|source| Error::AttendanceWrite {
            path: path.to_path_buf(),
            source,
        })?;
    temp.persist(path).map_err(|err| Error::AttendanceWrite {
        path: path.to_path_buf(),
        source: err.error,
    })?;

    info!("Attendance data saved to {}", path.display());
    Ok(())
}

/// Load the attendance record from `path`.
///
/// This never fails: a missing file yields an empty record (first run), and
/// unparseable content yields an empty record with a logged error. Losing
/// corrupt data is the accepted tradeoff; no backup or recovery is attempted.
#[must_use]
pub fn load(path: &Path) -> AttendanceRecord {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!(
                "Attendance file not found at {}; starting with an empty record",
                path.display()
            );
            return AttendanceRecord::new();
        }
        Err(err) => {
            error!(
                "Failed to read attendance file {}: {err}; starting with an empty record",
                path.display()
            );
            return AttendanceRecord::new();
        }
    };

    let document: AttendanceDocument = match serde_json::from_slice(&bytes) {
        Ok(document) => document,
        Err(err) => {
            error!(
                "Attendance file {} is corrupt: {err}; starting with an empty record",
                path.display()
            );
            return AttendanceRecord::new();
        }
    };

    match from_document(document) {
        Ok(record) => {
            info!("Attendance data loaded from {}", path.display());
            record
        }
        Err(bad_key) => {
            error!(
                "Attendance file {} has an invalid date key '{bad_key}'; starting with an empty record",
                path.display()
            );
            AttendanceRecord::new()
        }
    }
}

/// Flatten the in-memory record into the serialized document shape.
fn to_document(record: &AttendanceRecord) -> AttendanceDocument {
    record
        .iter()
        .map(|(date, groups)| {
            let day = groups
                .iter()
                .map(|(group, present)| (group.clone(), present.iter().cloned().collect()))
                .collect();
            (date.to_string(), day)
        })
        .collect()
}

/// Rebuild the in-memory record, converting sequences back to sets.
///
/// Fails with the offending key if any date key is not a valid ISO date.
fn from_document(document: AttendanceDocument) -> std::result::Result<AttendanceRecord, String> {
    document
        .into_iter()
        .map(|(date_str, day)| {
            let date = date_str
                .parse::<NaiveDate>()
                .map_err(|_| date_str.clone())?;
            let groups = day
                .into_iter()
                .map(|(group, members)| (group, members.into_iter().collect()))
                .collect();
            Ok((date, groups))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "rollcall_persist_{}_{}.json",
            std::process::id(),
            name
        ))
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn sample_record() -> AttendanceRecord {
        let mut record = AttendanceRecord::new();
        let mut day = BTreeMap::new();
        day.insert(
            "Red".to_string(),
            BTreeSet::from(["Bob".to_string(), "Alice".to_string()]),
        );
        day.insert("Blue".to_string(), BTreeSet::new());
        record.insert(date("2024-01-01"), day);
        record
    }

    #[test]
    fn test_round_trip() {
        let path = temp_path("roundtrip");
        let record = sample_record();

        save(&path, &record).unwrap();
        let loaded = load(&path);

        assert_eq!(loaded, record);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_empty_sets_survive_round_trip() {
        // "Checked, nobody present" must stay distinguishable from
        // "never checked" across a restart.
        let path = temp_path("empty_sets");
        let record = sample_record();

        save(&path, &record).unwrap();
        let loaded = load(&path);

        let day = loaded.get(&date("2024-01-01")).unwrap();
        assert!(day.contains_key("Blue"));
        assert!(day.get("Blue").unwrap().is_empty());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let path = temp_path("missing_never_written");
        let record = load(&path);
        assert!(record.is_empty());
    }

    #[test]
    fn test_load_corrupt_json() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "{ not json at all").unwrap();

        let record = load(&path);
        assert!(record.is_empty());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_wrong_shape() {
        let path = temp_path("wrong_shape");
        std::fs::write(&path, r#"{"2024-01-01": ["Alice"]}"#).unwrap();

        let record = load(&path);
        assert!(record.is_empty());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_invalid_date_key() {
        let path = temp_path("bad_date");
        std::fs::write(&path, r#"{"not-a-date": {"Red": ["Alice"]}}"#).unwrap();

        let record = load(&path);
        assert!(record.is_empty());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = std::env::temp_dir().join(format!(
            "rollcall_persist_{}_nested/deeper",
            std::process::id()
        ));
        let path = dir.join("attendance.json");
        let _ = std::fs::remove_dir_all(dir.parent().unwrap());

        save(&path, &sample_record()).unwrap();
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(dir.parent().unwrap());
    }

    #[test]
    fn test_save_is_deterministic() {
        let path_a = temp_path("determ_a");
        let path_b = temp_path("determ_b");
        let record = sample_record();

        save(&path_a, &record).unwrap();
        save(&path_b, &record).unwrap();

        assert_eq!(
            std::fs::read(&path_a).unwrap(),
            std::fs::read(&path_b).unwrap()
        );

        let _ = std::fs::remove_file(&path_a);
        let _ = std::fs::remove_file(&path_b);
    }

    #[test]
    fn test_save_overwrites_previous_content() {
        let path = temp_path("overwrite");
        save(&path, &sample_record()).unwrap();

        let empty = AttendanceRecord::new();
        save(&path, &empty).unwrap();

        assert!(load(&path).is_empty());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_member_lists_serialized_sorted() {
        let path = temp_path("sorted");
        save(&path, &sample_record()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let alice = text.find("Alice").unwrap();
        let bob = text.find("Bob").unwrap();
        assert!(alice < bob);

        let _ = std::fs::remove_file(&path);
    }
}
