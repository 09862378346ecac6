use thiserror::Error;

/// Errors raised by the tracker's stores.
///
/// The first four variants are the domain taxonomy the HTTP layer maps onto
/// status codes. The remaining ones wrap storage failures and are never shown
/// to clients verbatim.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Malformed or out-of-range input. User-correctable.
    #[error("{0}")]
    Validation(String),

    /// Unknown tree index or habit name.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate habit name.
    #[error("{0}")]
    Conflict(String),

    /// The habit was already completed during the current day.
    #[error("Habit '{0}' has already been completed today")]
    AlreadyCompleted(String),

    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored value could not be decoded back into its domain type.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

impl TrackerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Whether the error is caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound(_) | Self::Conflict(_) | Self::AlreadyCompleted(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
