//! Online backup creation + file-level restore.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use reliquary_core::{constants, ReliquaryResult};

use crate::to_storage_err;

/// Copy the live database to the given path using the online backup API.
/// Runs in 100-page steps with a short pause so readers are not starved.
pub fn create_backup(conn: &Connection, dest: &Path) -> ReliquaryResult<()> {
    let mut dst = Connection::open(dest).map_err(|e| to_storage_err(format!("open backup dest: {e}")))?;

    let backup = rusqlite::backup::Backup::new(conn, &mut dst)
        .map_err(|e| to_storage_err(format!("init backup: {e}")))?;

    backup
        .run_to_completion(100, std::time::Duration::from_millis(10), None)
        .map_err(|e| to_storage_err(format!("run backup: {e}")))?;

    Ok(())
}

/// Copy a backup's bytes over the live database path and drop stale WAL
/// and SHM siblings. The caller must have closed the live handle first.
/// Returns the number of bytes copied.
pub fn restore_over(live_path: &Path, backup_path: &Path) -> ReliquaryResult<u64> {
    let copied = std::fs::copy(backup_path, live_path)?;

    for suffix in [constants::WAL_SUFFIX, constants::SHM_SUFFIX] {
        let sibling = sibling_path(live_path, suffix);
        match std::fs::remove_file(&sibling) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!("failed to remove {}: {e}", sibling.display());
            }
        }
    }

    Ok(copied)
}

/// Build the `-wal` / `-shm` sibling of a database path.
pub fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}
