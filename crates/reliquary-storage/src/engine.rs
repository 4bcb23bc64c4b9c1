//! StorageEngine — owns the write connection to the live archive database.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use reliquary_core::{constants, ReliquaryResult};

use crate::backup::sibling_path;
use crate::connection::WriteConnection;
use crate::pragmas;

/// The storage engine. Owns the single write connection; the health
/// subsystem components hold it behind an `Arc` and never open their own
/// write handles.
pub struct StorageEngine {
    writer: WriteConnection,
    db_path: Option<PathBuf>,
}

impl StorageEngine {
    /// Open the engine against an existing file on disk. A missing file
    /// fails fast instead of materializing an empty database.
    pub fn open(path: &Path) -> ReliquaryResult<Self> {
        let writer = WriteConnection::open(path)?;
        let engine = Self {
            writer,
            db_path: Some(path.to_path_buf()),
        };
        engine.verify()?;
        Ok(engine)
    }

    /// Create the database file if needed and open the engine (first-run
    /// installs and test fixtures).
    pub fn create(path: &Path) -> ReliquaryResult<Self> {
        let writer = WriteConnection::create(path)?;
        let engine = Self {
            writer,
            db_path: Some(path.to_path_buf()),
        };
        engine.verify()?;
        Ok(engine)
    }

    /// Open an in-memory engine (for testing).
    pub fn open_in_memory() -> ReliquaryResult<Self> {
        let writer = WriteConnection::open_in_memory()?;
        Ok(Self {
            writer,
            db_path: None,
        })
    }

    /// Confirm WAL mode actually took effect on the file-backed connection.
    fn verify(&self) -> ReliquaryResult<()> {
        self.with_conn(|conn| {
            if !pragmas::verify_wal_mode(conn)? {
                tracing::warn!("journal_mode is not WAL; checkpointing will be a no-op");
            }
            Ok(())
        })
    }

    /// Execute a closure against the write connection.
    pub fn with_conn<F, T>(&self, f: F) -> ReliquaryResult<T>
    where
        F: FnOnce(&Connection) -> ReliquaryResult<T>,
    {
        self.writer.with_conn(f)
    }

    /// Close the write connection so the live file can be replaced.
    pub fn close(&self) -> ReliquaryResult<()> {
        self.writer.close()
    }

    /// Reopen the write connection after a restore.
    pub fn reopen(&self) -> ReliquaryResult<()> {
        self.writer.reopen()
    }

    /// Whether the write connection is currently open.
    pub fn is_open(&self) -> bool {
        self.writer.is_open()
    }

    /// Path of the live database file, `None` for in-memory engines.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Path of the WAL file next to the live database.
    pub fn wal_path(&self) -> Option<PathBuf> {
        self.db_path
            .as_deref()
            .map(|p| sibling_path(p, constants::WAL_SUFFIX))
    }

    /// Size of the main file in bytes, 0 for in-memory engines.
    pub fn db_size(&self) -> u64 {
        self.db_path
            .as_deref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0)
    }
}
