/// Recovery subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("recovery attempts exhausted: {attempts} of {max} used")]
    AttemptsExhausted { attempts: u32, max: u32 },

    #[error("recovery cooldown active: {remaining_secs}s remaining")]
    CooldownActive { remaining_secs: i64 },

    #[error("no verified backup available for restore")]
    NoVerifiedBackup,

    #[error("restore failed: {reason}")]
    RestoreFailed { reason: String },
}
