use thiserror::Error;

/// Why a promo code or gift card was refused during pricing or commit.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeRejection {
    #[error("code is inactive")]
    Inactive,
    #[error("code is expired")]
    Expired,
    #[error("code is exhausted")]
    Exhausted,
    #[error("code is cancelled")]
    Cancelled,
    #[error("code is outside its validity window")]
    OutOfWindow,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Slot conflict: {0}")]
    SlotConflict(String),
    #[error("Code '{code}' rejected: {reason}")]
    CodeRejected { code: String, reason: CodeRejection },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True when a failed insert lost the race for a slot.
    ///
    /// 2067 = SQLite unique constraint, 23505 = Postgres unique violation.
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        if let Some(db_err) = err.as_database_error() {
            let code = db_err.code().unwrap_or_default();
            return code == "2067" || code == "23505";
        }
        false
    }
}
