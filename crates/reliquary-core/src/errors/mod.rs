//! Error types for the persistence layer, one file per domain.

mod recovery_error;
mod storage_error;

pub use recovery_error::RecoveryError;
pub use storage_error::StorageError;

/// Umbrella error for the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum ReliquaryError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Recovery(#[from] RecoveryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the workspace.
pub type ReliquaryResult<T> = Result<T, ReliquaryError>;
