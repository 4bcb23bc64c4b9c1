//! Single write connection guarding the live database file.
//!
//! Exactly one process holds the live database open; the handle can be
//! closed and reopened so recovery can swap the file underneath it.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};

use reliquary_core::errors::StorageError;
use reliquary_core::ReliquaryResult;

use crate::pragmas;
use crate::to_storage_err;

/// The write connection. Interior mutability so recovery can close and
/// reopen it through a shared reference.
pub struct WriteConnection {
    conn: Mutex<Option<Connection>>,
    path: Option<PathBuf>,
}

impl WriteConnection {
    /// Open the write connection for an existing database file. A missing
    /// file is a hard error, never silently created.
    pub fn open(path: &Path) -> ReliquaryResult<Self> {
        let conn = Self::open_configured(path)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Create the database file if needed and open the write connection.
    /// For first-run installs and test fixtures.
    pub fn create(path: &Path) -> ReliquaryResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        pragmas::apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory write connection (for testing).
    pub fn open_in_memory() -> ReliquaryResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        pragmas::apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path: None,
        })
    }

    // No SQLITE_OPEN_CREATE: a mistyped path must not materialize an
    // empty database where the archive was expected.
    fn open_configured(path: &Path) -> ReliquaryResult<Connection> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        pragmas::apply_pragmas(&conn)?;
        Ok(conn)
    }

    /// Execute a closure against the connection. Fails with
    /// [`StorageError::ConnectionClosed`] while the handle is closed.
    pub fn with_conn<F, T>(&self, f: F) -> ReliquaryResult<T>
    where
        F: FnOnce(&Connection) -> ReliquaryResult<T>,
    {
        let guard = self.conn.lock().map_err(|e| {
            StorageError::LockPoisoned {
                context: format!("write connection: {e}"),
            }
        })?;
        match guard.as_ref() {
            Some(conn) => f(conn),
            None => Err(StorageError::ConnectionClosed.into()),
        }
    }

    /// Drop the live connection. Idempotent.
    pub fn close(&self) -> ReliquaryResult<()> {
        let mut guard = self.conn.lock().map_err(|e| {
            StorageError::LockPoisoned {
                context: format!("write connection: {e}"),
            }
        })?;
        if let Some(conn) = guard.take() {
            if let Err((conn, e)) = conn.close() {
                // Put it back so the handle stays usable.
                *guard = Some(conn);
                return Err(to_storage_err(e.to_string()));
            }
        }
        Ok(())
    }

    /// Reopen after a close. Only valid for file-backed connections.
    pub fn reopen(&self) -> ReliquaryResult<()> {
        let path = self.path.as_ref().ok_or(StorageError::ConnectionClosed)?;
        let conn = Self::open_configured(path)?;
        let mut guard = self.conn.lock().map_err(|e| {
            StorageError::LockPoisoned {
                context: format!("write connection: {e}"),
            }
        })?;
        *guard = Some(conn);
        Ok(())
    }

    /// Whether a live connection is currently held.
    pub fn is_open(&self) -> bool {
        self.conn.lock().map(|g| g.is_some()).unwrap_or(false)
    }
}

/// Open a read-only connection to an arbitrary database file, used to
/// validate backup copies without touching the live handle.
pub fn open_read_only(path: &Path) -> ReliquaryResult<Connection> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
