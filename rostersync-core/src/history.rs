//! Bounded run history.
//!
//! A JSON array of run summaries, oldest first. Reads never fail: a
//! missing or unreadable file is an empty history. Writes replace the file
//! via a temporary sibling, so an interrupted write leaves the previous
//! history in place. Appends hold an exclusive lock on a sibling
//! `.lock` file so concurrent runs never drop each other's entries.

use chrono::Local;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::HISTORY_TIME_FORMAT;
use crate::error::{RosterSyncError, RosterSyncResult};
use crate::outcome::RunStats;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub time: String,
    #[serde(default)]
    pub created: usize,
    #[serde(default)]
    pub updated: usize,
    #[serde(default)]
    pub errors: usize,
    #[serde(default)]
    pub note: String,
}

impl HistoryEntry {
    pub fn now(stats: &RunStats, note: &str) -> Self {
        HistoryEntry {
            time: Local::now().format(HISTORY_TIME_FORMAT).to_string(),
            created: stats.created,
            updated: stats.updated,
            errors: stats.errors,
            note: note.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunHistory {
    path: PathBuf,
    cap: usize,
}

enum LoadError {
    Missing,
    Unreadable(String),
}

impl RunHistory {
    pub fn new(path: impl Into<PathBuf>, cap: usize) -> Self {
        RunHistory {
            path: path.into(),
            cap,
        }
    }

    /// `<data_dir>/rostersync/history.json`
    pub fn default_path() -> RosterSyncResult<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| RosterSyncError::Config("Could not determine data directory".into()))?;
        Ok(data_dir.join("rostersync").join("history.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// All entries, oldest to newest.
    pub fn load(&self) -> Vec<HistoryEntry> {
        match self.read_entries() {
            Ok(entries) => entries,
            Err(LoadError::Missing) => Vec::new(),
            Err(LoadError::Unreadable(reason)) => {
                tracing::warn!(path = %self.path.display(), %reason, "Ignoring unreadable run history");
                Vec::new()
            }
        }
    }

    /// Append a timestamped entry for a finished run.
    pub fn record(&self, stats: &RunStats, note: &str) -> RosterSyncResult<HistoryEntry> {
        let entry = HistoryEntry::now(stats, note);
        self.append(entry.clone())?;
        Ok(entry)
    }

    pub fn append(&self, entry: HistoryEntry) -> RosterSyncResult<()> {
        let _guard = self.lock()?;

        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(LoadError::Missing) => Vec::new(),
            Err(LoadError::Unreadable(reason)) => {
                self.set_aside_unreadable(&reason);
                Vec::new()
            }
        };

        entries.push(entry);
        self.write(&keep_newest(entries, self.cap))
    }

    /// Blocks until no other append holds the history; released on drop.
    fn lock(&self) -> RosterSyncResult<std::fs::File> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.path.with_extension("json.lock"))?;
        file.lock_exclusive()?;
        Ok(file)
    }

    fn read_entries(&self) -> Result<Vec<HistoryEntry>, LoadError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(LoadError::Missing),
            Err(e) => return Err(LoadError::Unreadable(e.to_string())),
        };

        serde_json::from_str(&contents).map_err(|e| LoadError::Unreadable(e.to_string()))
    }

    /// Keep a copy of a corrupt history next to it before it gets replaced.
    fn set_aside_unreadable(&self, reason: &str) {
        let backup = self.path.with_extension("json.corrupt");
        match std::fs::copy(&self.path, &backup) {
            Ok(_) => tracing::warn!(
                path = %self.path.display(),
                backup = %backup.display(),
                %reason,
                "Run history was unreadable; starting a new one"
            ),
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                %reason,
                "Run history was unreadable and could not be backed up"
            ),
        }
    }

    fn write(&self, entries: &[HistoryEntry]) -> RosterSyncResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(entries)
            .map_err(|e| RosterSyncError::History(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;

        Ok(())
    }
}

/// Drop the oldest entries until at most `cap` remain.
fn keep_newest(mut entries: Vec<HistoryEntry>, cap: usize) -> Vec<HistoryEntry> {
    if entries.len() > cap {
        let excess = entries.len() - cap;
        entries.drain(..excess);
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry {
            time: format!("2025-08-14 10:00:{:02}", n % 60),
            created: n,
            updated: 0,
            errors: 0,
            note: format!("run {n}"),
        }
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let history = RunHistory::new(dir.path().join("history.json"), 100);
        assert!(history.load().is_empty());
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{ not json").unwrap();

        let history = RunHistory::new(&path, 100);
        assert!(history.load().is_empty());
        // Reading leaves the file alone.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_empty_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "").unwrap();
        assert!(RunHistory::new(&path, 100).load().is_empty());
    }

    #[test]
    fn test_append_after_corruption_backs_up_and_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "garbage").unwrap();

        let history = RunHistory::new(&path, 100);
        history.append(entry(1)).unwrap();

        assert_eq!(history.load(), vec![entry(1)]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("history.json.corrupt")).unwrap(),
            "garbage"
        );
    }

    #[test]
    fn test_entries_come_back_oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        let history = RunHistory::new(dir.path().join("history.json"), 100);
        for n in 0..3 {
            history.append(entry(n)).unwrap();
        }
        assert_eq!(history.load(), vec![entry(0), entry(1), entry(2)]);
    }

    #[test]
    fn test_cap_keeps_most_recent_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let history = RunHistory::new(dir.path().join("nested").join("history.json"), 5);
        for n in 0..12 {
            history.append(entry(n)).unwrap();
        }

        let loaded = history.load();
        assert_eq!(loaded.len(), 5);
        assert_eq!(loaded, (7..12).map(entry).collect::<Vec<_>>());
    }

    #[test]
    fn test_record_stamps_stats_and_note() {
        let dir = tempfile::tempdir().unwrap();
        let history = RunHistory::new(dir.path().join("history.json"), 100);
        let stats = RunStats { created: 1, updated: 2, errors: 0 };

        let recorded = history.record(&stats, "ok").unwrap();

        assert_eq!(recorded.created, 1);
        assert_eq!(recorded.updated, 2);
        assert_eq!(recorded.note, "ok");
        assert_eq!(recorded.time.len(), "2025-08-14 10:00:00".len());
        assert_eq!(history.load(), vec![recorded]);
    }

    #[test]
    fn test_reads_entries_written_by_older_versions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(
            &path,
            r#"[{"time":"2025-08-14 10:00:00","created":1,"updated":2,"errors":0,"note":"ok"},
                {"time":"2025-08-14 11:00:00","created":0,"updated":0,"errors":1}]"#,
        )
        .unwrap();

        let loaded = RunHistory::new(&path, 100).load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].note, "");
    }

    #[test]
    fn test_concurrent_appends_keep_every_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let history = RunHistory::new(&path, 100);
                std::thread::spawn(move || {
                    for i in 0..5 {
                        history.append(entry(n * 10 + i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut created: Vec<_> = RunHistory::new(&path, 100)
            .load()
            .into_iter()
            .map(|e| e.created)
            .collect();
        created.sort_unstable();
        let expected: Vec<_> = (0..8).flat_map(|n| (0..5).map(move |i| n * 10 + i)).collect();
        assert_eq!(created, expected);
    }

    #[test]
    fn test_keep_newest_leaves_short_lists_alone() {
        let entries = vec![entry(1), entry(2)];
        assert_eq!(keep_newest(entries.clone(), 5), entries);
    }
}
