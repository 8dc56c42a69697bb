//! The attendance store.
//!
//! This module owns the roster and the per-date, per-group presence records.
//! All mutation goes through [`AttendanceStore`]; the `&mut self` receivers
//! statically serialize access, so no locking is needed as long as a single
//! owner drives the store (the intended single-threaded model).

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::persist;
use crate::roster::Roster;

/// Presence records: date → group → set of members marked present.
///
/// An empty set is meaningful: it records that the group was checked on that
/// date and nobody was present, which is distinct from the group never having
/// been checked at all.
pub type AttendanceRecord = BTreeMap<NaiveDate, BTreeMap<String, BTreeSet<String>>>;

/// Counts of record entries removed by [`AttendanceStore::purge_stale`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeOutcome {
    /// Number of (date, group) branches removed because the group is no
    /// longer in the roster.
    pub groups_removed: usize,
    /// Number of member names removed from surviving branches because they
    /// are no longer in their group's roster.
    pub members_removed: usize,
}

impl PurgeOutcome {
    /// Check if the purge removed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups_removed == 0 && self.members_removed == 0
    }
}

/// Owner of the roster and the attendance records.
///
/// Marks buffer in memory; [`persist`](AttendanceStore::persist) must be
/// called explicitly to make them durable. On construction the store loads
/// whatever the durable file holds, recovering to an empty record if the
/// file is missing or corrupt.
#[derive(Debug)]
pub struct AttendanceStore {
    /// Path to the durable attendance file.
    path: PathBuf,
    /// The current roster; replaced wholesale on import.
    roster: Roster,
    /// In-memory presence records.
    attendance: AttendanceRecord,
}

impl AttendanceStore {
    /// Open a store backed by the attendance file at `path`.
    ///
    /// A missing or corrupt file yields an empty record; this never fails.
    #[must_use]
    pub fn open(path: impl AsRef<Path>, roster: Roster) -> Self {
        let path = path.as_ref().to_path_buf();
        let attendance = persist::load(&path);
        Self {
            path,
            roster,
            attendance,
        }
    }

    /// Get the path to the durable attendance file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the current roster.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Get all group names, lexicographically sorted.
    ///
    /// The order is stable until the roster is replaced, so positional
    /// indices cached by a presentation layer stay valid between imports.
    #[must_use]
    pub fn group_names(&self) -> Vec<&str> {
        self.roster.group_names()
    }

    /// Get the members of a group, sorted; empty for unknown groups.
    #[must_use]
    pub fn members_of(&self, group: &str) -> &[String] {
        self.roster.members_of(group)
    }

    /// Get the set of members marked present for a group on a date.
    ///
    /// Total query: returns an empty set when nothing was recorded.
    #[must_use]
    pub fn present_on(&self, date: NaiveDate, group: &str) -> BTreeSet<String> {
        self.attendance
            .get(&date)
            .and_then(|day| day.get(group))
            .cloned()
            .unwrap_or_default()
    }

    /// Check if a member is marked present for a group on a date.
    #[must_use]
    pub fn is_present(&self, date: NaiveDate, group: &str, member: &str) -> bool {
        self.attendance
            .get(&date)
            .and_then(|day| day.get(group))
            .is_some_and(|present| present.contains(member))
    }

    /// Mark a member present for a group on a date.
    ///
    /// A group or member not in the current roster is rejected silently with
    /// a logged warning: the presentation layer only offers valid members,
    /// so there is nothing useful for it to retry. Marking an
    /// already-present member is a no-op.
    pub fn mark(&mut self, date: NaiveDate, group: &str, member: &str) {
        if !self.roster.contains(group, member) {
            warn!("Ignoring mark for unknown group/member: {group} / {member}");
            return;
        }

        let inserted = self
            .attendance
            .entry(date)
            .or_default()
            .entry(group.to_string())
            .or_default()
            .insert(member.to_string());
        if inserted {
            debug!("Marked {member} present in {group} on {date}");
        }
    }

    /// Mark a member absent (remove from the present set).
    ///
    /// Removing a member that was never marked is a no-op. The (date, group)
    /// record is kept even when the set becomes empty, preserving the
    /// "checked, nobody present" state.
    pub fn unmark(&mut self, date: NaiveDate, group: &str, member: &str) {
        if let Some(day) = self.attendance.get_mut(&date) {
            if let Some(present) = day.get_mut(group) {
                if present.remove(member) {
                    debug!("Marked {member} absent in {group} on {date}");
                }
            }
        }
    }

    /// Flip a member's presence for a group on a date.
    ///
    /// Returns the new presence state, or `None` if the group or member is
    /// not in the current roster.
    pub fn toggle(&mut self, date: NaiveDate, group: &str, member: &str) -> Option<bool> {
        if !self.roster.contains(group, member) {
            warn!("Ignoring toggle for unknown group/member: {group} / {member}");
            return None;
        }

        if self.is_present(date, group, member) {
            self.unmark(date, group, member);
            Some(false)
        } else {
            self.mark(date, group, member);
            Some(true)
        }
    }

    /// Replace the roster wholesale.
    ///
    /// Attendance records are not touched: entries referencing groups or
    /// members absent from the new roster dangle until
    /// [`purge_stale`](Self::purge_stale) is invoked explicitly.
    pub fn replace_roster(&mut self, roster: Roster) {
        info!(
            "Replacing roster: {} group(s) -> {} group(s)",
            self.roster.group_count(),
            roster.group_count()
        );
        self.roster = roster;
    }

    /// Remove record entries referencing groups or members no longer in the
    /// current roster.
    ///
    /// Branches for unknown groups are dropped (and dates left with no
    /// branches with them). Stale member names are removed from known
    /// groups' sets; a set emptied this way is kept as "checked".
    pub fn purge_stale(&mut self) -> PurgeOutcome {
        let mut outcome = PurgeOutcome::default();
        let roster = &self.roster;

        self.attendance.retain(|_, day| {
            day.retain(|group, present| {
                if !roster.contains_group(group) {
                    outcome.groups_removed += 1;
                    return false;
                }
                let before = present.len();
                present.retain(|member| roster.contains(group, member));
                outcome.members_removed += before - present.len();
                true
            });
            !day.is_empty()
        });

        if outcome.is_empty() {
            debug!("Purge found no stale attendance entries");
        } else {
            info!(
                "Purged stale attendance entries: {} group branch(es), {} member name(s)",
                outcome.groups_removed, outcome.members_removed
            );
        }
        outcome
    }

    /// Write the in-memory record to the durable file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails; the
    /// in-memory state is unaffected either way.
    pub fn persist(&self) -> Result<()> {
        persist::save(&self.path, &self.attendance)
    }

    /// Discard the in-memory record and reload it from the durable file.
    ///
    /// Unsaved marks are lost. Like opening, this never fails: a missing or
    /// corrupt file yields an empty record.
    pub fn reload(&mut self) {
        self.attendance = persist::load(&self.path);
    }

    /// Read access to the full record, for report building.
    #[must_use]
    pub fn record(&self) -> &AttendanceRecord {
        &self.attendance
    }
}
