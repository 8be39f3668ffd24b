//! Error types for annot.

use thiserror::Error;

/// Result type alias using annot's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for annot operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller lacks a base or privacy-scoped permission
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller holds the permission but fails the ownership check
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Malformed input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Referenced note does not exist (or vanished before the write landed)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Non-database storage backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for failures of the persistence collaborator.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Error::Database(_) | Error::Storage(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::BadRequest(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unauthorized() {
        let err = Error::Unauthorized("note.read required".to_string());
        assert_eq!(err.to_string(), "Unauthorized: note.read required");
    }

    #[test]
    fn test_error_display_forbidden() {
        let err = Error::Forbidden("cannot delete another user's note".to_string());
        assert_eq!(
            err.to_string(),
            "Forbidden: cannot delete another user's note"
        );
    }

    #[test]
    fn test_error_display_bad_request() {
        let err = Error::BadRequest("unknown resource type".to_string());
        assert_eq!(err.to_string(), "Bad request: unknown resource type");
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("Note 12 not found".to_string());
        assert_eq!(err.to_string(), "Not found: Note 12 not found");
    }

    #[test]
    fn test_error_display_storage() {
        let err = Error::Storage("disk full".to_string());
        assert_eq!(err.to_string(), "Storage error: disk full");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("PORT is not a number".to_string());
        assert_eq!(err.to_string(), "Configuration error: PORT is not a number");
    }

    #[test]
    fn test_storage_failure_classification() {
        assert!(Error::Database(sqlx::Error::RowNotFound).is_storage_failure());
        assert!(Error::Storage("x".into()).is_storage_failure());
        assert!(!Error::NotFound("x".into()).is_storage_failure());
        assert!(!Error::Forbidden("x".into()).is_storage_failure());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::BadRequest(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
