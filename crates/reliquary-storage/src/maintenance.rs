//! Checkpoint, integrity check, foreign-key check, VACUUM, ANALYZE,
//! and page accounting over PRAGMA.

use rusqlite::Connection;

use reliquary_core::models::CheckpointMode;
use reliquary_core::ReliquaryResult;

use crate::to_storage_err;

/// Raw page counts returned by `PRAGMA wal_checkpoint`.
#[derive(Debug, Clone, Copy)]
pub struct CheckpointCounts {
    /// True when the checkpoint could not run to completion due to a reader.
    pub busy: bool,
    /// Frames currently in the WAL (-1 before the first write).
    pub log_pages: i64,
    /// Frames moved into the main file.
    pub checkpointed_pages: i64,
}

/// Run a WAL checkpoint in the given mode.
pub fn wal_checkpoint(conn: &Connection, mode: CheckpointMode) -> ReliquaryResult<CheckpointCounts> {
    let sql = format!("PRAGMA wal_checkpoint({})", mode.as_sql());
    let (busy, log_pages, checkpointed_pages): (i64, i64, i64) = conn
        .query_row(&sql, [], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(CheckpointCounts {
        busy: busy != 0,
        log_pages,
        checkpointed_pages,
    })
}

/// `PRAGMA quick_check`: fast structural validation. Returns every
/// message row that is not "ok".
pub fn quick_check(conn: &Connection) -> ReliquaryResult<Vec<String>> {
    check_pragma(conn, "PRAGMA quick_check")
}

/// `PRAGMA integrity_check`: exhaustive structural validation. Returns
/// every message row that is not "ok".
pub fn integrity_check(conn: &Connection) -> ReliquaryResult<Vec<String>> {
    check_pragma(conn, "PRAGMA integrity_check")
}

fn check_pragma(conn: &Connection, sql: &str) -> ReliquaryResult<Vec<String>> {
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut messages = Vec::new();
    for row in rows {
        let message = row.map_err(|e| to_storage_err(e.to_string()))?;
        if !message.eq_ignore_ascii_case("ok") {
            messages.push(message);
        }
    }
    Ok(messages)
}

/// `PRAGMA foreign_key_check`: one formatted message per violation.
pub fn foreign_key_check(conn: &Connection) -> ReliquaryResult<Vec<String>> {
    let mut stmt = conn
        .prepare("PRAGMA foreign_key_check")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            let table: String = row.get(0)?;
            let rowid: Option<i64> = row.get(1)?;
            let parent: String = row.get(2)?;
            Ok((table, rowid, parent))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut violations = Vec::new();
    for row in rows {
        let (table, rowid, parent) = row.map_err(|e| to_storage_err(e.to_string()))?;
        match rowid {
            Some(rowid) => violations.push(format!(
                "foreign key violation in {table} (rowid {rowid}) referencing {parent}"
            )),
            None => violations.push(format!(
                "foreign key violation in {table} referencing {parent}"
            )),
        }
    }
    Ok(violations)
}

/// Run full VACUUM.
pub fn full_vacuum(conn: &Connection) -> ReliquaryResult<()> {
    conn.execute_batch("VACUUM")
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Refresh the query planner statistics.
pub fn analyze(conn: &Connection) -> ReliquaryResult<()> {
    conn.execute_batch("ANALYZE")
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Database page size in bytes.
pub fn page_size(conn: &Connection) -> ReliquaryResult<u64> {
    conn.pragma_query_value(None, "page_size", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Number of pages in the main file.
pub fn page_count(conn: &Connection) -> ReliquaryResult<u64> {
    conn.pragma_query_value(None, "page_count", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Number of unused pages on the freelist.
pub fn freelist_count(conn: &Connection) -> ReliquaryResult<u64> {
    conn.pragma_query_value(None, "freelist_count", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))
}
