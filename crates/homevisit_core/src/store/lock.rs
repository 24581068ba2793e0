//! Single-writer lock file for one table.
//!
//! # Invariants
//! - At most one `WriterLock` exists per table path across processes.
//! - The lock file is removed when the guard drops.

use super::{StoreError, StoreResult};
use log::{debug, warn};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const LOCK_SUFFIX: &str = "lock";

/// Guard for the `<table file>.lock` sidecar.
#[derive(Debug)]
pub struct WriterLock {
    lock_path: PathBuf,
}

impl WriterLock {
    /// Creates the lock file for `table_path`.
    ///
    /// # Errors
    /// - `StoreError::Locked` when the lock file already exists.
    /// - `StoreError::Io` when the lock file cannot be created.
    pub fn acquire(table_path: &Path) -> StoreResult<Self> {
        let lock_path = lock_path_for(table_path);
        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                warn!("event=table_lock module=store status=busy");
                return Err(StoreError::Locked(lock_path));
            }
            Err(err) => return Err(err.into()),
        };
        // pid is informational only
        let _ = writeln!(file, "{}", std::process::id());
        debug!("event=table_lock module=store status=acquired");
        Ok(Self { lock_path })
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for WriterLock {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.lock_path) {
            warn!("event=table_unlock module=store status=error error={err}");
        }
    }
}

fn lock_path_for(table_path: &Path) -> PathBuf {
    let mut name = table_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(LOCK_SUFFIX);
    table_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::WriterLock;
    use crate::store::StoreError;

    #[test]
    fn second_acquire_fails_until_first_guard_drops() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("nurse_log.csv");

        let first = WriterLock::acquire(&table).unwrap();
        assert!(first.lock_path().ends_with("nurse_log.csv.lock"));
        assert!(matches!(
            WriterLock::acquire(&table),
            Err(StoreError::Locked(_))
        ));

        drop(first);
        let again = WriterLock::acquire(&table).unwrap();
        assert!(again.lock_path().exists());
    }
}
