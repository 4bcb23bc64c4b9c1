//! # reliquary-storage
//!
//! SQLite access layer for the archive database: single-writer connection
//! handle, pragma configuration, and the checkpoint / integrity / backup
//! primitives the health subsystem is built on.

pub mod backup;
pub mod connection;
pub mod engine;
pub mod maintenance;
pub mod pragmas;

pub use engine::StorageEngine;

use reliquary_core::errors::StorageError;
use reliquary_core::ReliquaryError;

/// Map an SQLite error message into the storage error type.
pub(crate) fn to_storage_err(message: impl Into<String>) -> ReliquaryError {
    StorageError::Sqlite {
        message: message.into(),
    }
    .into()
}
