/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("database corruption detected: {details}")]
    CorruptionDetected { details: String },

    #[error("connection is closed")]
    ConnectionClosed,

    #[error("database file missing: {path}")]
    MissingDatabase { path: String },

    #[error("lock poisoned: {context}")]
    LockPoisoned { context: String },
}
