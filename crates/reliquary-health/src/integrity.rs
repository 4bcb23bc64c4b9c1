//! Quick and full structural validation of the live database or a backup copy.

use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;

use reliquary_core::models::IntegrityResult;
use reliquary_storage::{connection, maintenance, StorageEngine};

/// Validates the live file or an arbitrary backup copy. Unreachable or
/// unreadable files produce an unhealthy [`IntegrityResult`] with the I/O
/// error recorded; this type never propagates errors to callers.
pub struct IntegrityChecker {
    engine: Arc<StorageEngine>,
}

impl IntegrityChecker {
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self { engine }
    }

    /// Fast structural validation, safe for startup and periodic polling.
    pub fn run_quick_check(&self) -> IntegrityResult {
        let outcome = self.engine.with_conn(|conn| maintenance::quick_check(conn));
        match outcome {
            Ok(messages) if messages.is_empty() => IntegrityResult::healthy(),
            Ok(messages) => IntegrityResult::unhealthy(messages),
            Err(e) => IntegrityResult::unhealthy(vec![e.to_string()]),
        }
    }

    /// Exhaustive validation of the live file: full integrity check plus
    /// foreign-key check. Used before recovery and for manual refreshes.
    pub fn run_full_check(&self) -> IntegrityResult {
        let outcome = self.engine.with_conn(|conn| {
            let errors = maintenance::integrity_check(conn)?;
            let violations = maintenance::foreign_key_check(conn)?;
            Ok((errors, violations))
        });
        match outcome {
            Ok((errors, violations)) => Self::build_result(errors, violations),
            Err(e) => IntegrityResult::unhealthy(vec![e.to_string()]),
        }
    }

    /// Full validation of a backup copy through its own read-only
    /// connection, without touching the live handle.
    pub fn verify_backup_file(&self, path: &Path) -> IntegrityResult {
        let conn = match connection::open_read_only(path) {
            Ok(conn) => conn,
            Err(e) => return IntegrityResult::unhealthy(vec![e.to_string()]),
        };
        Self::full_check_on(&conn)
    }

    fn full_check_on(conn: &Connection) -> IntegrityResult {
        let errors = match maintenance::integrity_check(conn) {
            Ok(errors) => errors,
            Err(e) => return IntegrityResult::unhealthy(vec![e.to_string()]),
        };
        let violations = match maintenance::foreign_key_check(conn) {
            Ok(violations) => violations,
            Err(e) => return IntegrityResult::unhealthy(vec![e.to_string()]),
        };
        Self::build_result(errors, violations)
    }

    /// Structural errors decide health; foreign-key violations are
    /// surfaced as warnings (the file is readable but inconsistent).
    fn build_result(errors: Vec<String>, violations: Vec<String>) -> IntegrityResult {
        let mut result = if errors.is_empty() {
            IntegrityResult::healthy()
        } else {
            IntegrityResult::unhealthy(errors)
        };
        result.warnings = violations;
        result
    }
}
