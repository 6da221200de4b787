//! Moderation error types.

use thiserror::Error;

/// Moderation errors
#[derive(Debug, Error)]
pub enum ModerationError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("A ban reason is required")]
    ReasonRequired,

    #[error("Ban duration must be positive")]
    InvalidDuration,

    #[error("User {0} is already banned")]
    AlreadyBanned(String),

    #[error("User {0} is not banned")]
    NotBanned(String),

    /// Amount not in `1..=MAX_ADJUSTMENT_AMOUNT`
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// Summing a wallet's entries left the i64 range
    #[error("Net adjustment for user {0} is out of range")]
    NetOverflow(String),

    /// Idempotency key already stored by the repository
    #[error("Duplicate idempotency key: {0}")]
    DuplicateKey(String),

    /// Idempotency key reused for a different adjustment
    #[error("Idempotency key {0} was already used for a different adjustment")]
    KeyConflict(String),

    /// Stored row could not be decoded
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
}

impl ModerationError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            // Sanitize database errors - don't expose SQL details
            ModerationError::Database(_) | ModerationError::CorruptRecord(_) => {
                "Internal server error".to_string()
            }
            // All other errors are safe to expose
            _ => self.to_string(),
        }
    }
}

pub type ModerationResult<T> = Result<T, ModerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_hides_storage_details() {
        let err = ModerationError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.client_message(), "Internal server error");

        let err = ModerationError::CorruptRecord("direction = 'sideways'".to_string());
        assert_eq!(err.client_message(), "Internal server error");

        let err = ModerationError::InvalidAmount(-5);
        assert_eq!(err.client_message(), "Invalid amount: -5");
    }
}
