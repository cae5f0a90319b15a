//! Single-flight guard: at most one reconcile run per remote calendar.
//!
//! The lock is an exclusive advisory lock on a file keyed by calendar id,
//! so it holds across processes (a scheduled run and a manual one) as well
//! as within one. The [`Reconciler`](crate::reconcile::Reconciler) demands
//! a `&RunLock` for the calendar it syncs.

use fs2::FileExt;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::{RosterSyncError, RosterSyncResult};

/// Held for the duration of a run; released on drop.
#[derive(Debug)]
pub struct RunLock {
    calendar_id: String,
    path: PathBuf,
    _file: File,
}

fn lock_dir() -> RosterSyncResult<PathBuf> {
    let runtime_dir = dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .ok_or_else(|| RosterSyncError::Config("Could not determine runtime directory".into()))?;

    Ok(runtime_dir.join("rostersync"))
}

/// Readable slug plus a short digest of the raw id; slugging alone maps
/// ids like `a.b@x` and `a-b@x` to the same file.
fn lock_file_name(calendar_id: &str) -> String {
    let digest = hex::encode(Sha256::digest(calendar_id.as_bytes()));
    let short = &digest[..12];

    let slug = slug::slugify(calendar_id);
    if slug.is_empty() {
        format!("calendar-{short}.lock")
    } else {
        format!("{slug}-{short}.lock")
    }
}

impl RunLock {
    /// Acquire the lock for `calendar_id`, failing if another run holds it.
    pub fn acquire(calendar_id: &str) -> RosterSyncResult<Self> {
        Self::acquire_in(&lock_dir()?, calendar_id)
    }

    pub fn acquire_in(dir: &Path, calendar_id: &str) -> RosterSyncResult<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(lock_file_name(calendar_id));
        let file = File::create(&path)?;

        file.try_lock_exclusive().map_err(|_| {
            tracing::warn!(lock = %path.display(), "Sync already in progress");
            RosterSyncError::AlreadyRunning(calendar_id.to_string())
        })?;

        Ok(RunLock {
            calendar_id: calendar_id.to_string(),
            path,
            _file: file,
        })
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_while_held() {
        let dir = tempfile::tempdir().unwrap();
        let first = RunLock::acquire_in(dir.path(), "roster@example.com").unwrap();

        let err = RunLock::acquire_in(dir.path(), "roster@example.com").unwrap_err();
        assert!(matches!(err, RosterSyncError::AlreadyRunning(ref id) if id == "roster@example.com"));

        drop(first);
        assert!(RunLock::acquire_in(dir.path(), "roster@example.com").is_ok());
    }

    #[test]
    fn test_different_calendars_do_not_contend() {
        let dir = tempfile::tempdir().unwrap();
        let _a = RunLock::acquire_in(dir.path(), "a@example.com").unwrap();
        assert!(RunLock::acquire_in(dir.path(), "b@example.com").is_ok());
    }

    #[test]
    fn test_lock_file_name_is_slugged() {
        let name = lock_file_name("Roster@Group.Calendar");
        assert!(name.starts_with("roster-group-calendar-"), "{name}");
        assert!(name.ends_with(".lock"));
        assert!(lock_file_name("@@@").starts_with("calendar-"));
        assert_eq!(lock_file_name("a@x"), lock_file_name("a@x"));
    }

    #[test]
    fn test_ids_with_same_slug_get_distinct_locks() {
        assert_eq!(slug::slugify("a.b@x"), slug::slugify("a-b@x"));
        assert_ne!(lock_file_name("a.b@x"), lock_file_name("a-b@x"));

        let dir = tempfile::tempdir().unwrap();
        let _first = RunLock::acquire_in(dir.path(), "a.b@x").unwrap();
        assert!(RunLock::acquire_in(dir.path(), "a-b@x").is_ok());
    }
}
