use thiserror::Error;

use crate::storage::StorageError;
use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Session data error: {0}")]
    Serde(String),

    #[error("Session not found")]
    NotFound,

    #[error("Missing claim: {0}")]
    MissingClaim(String),

    #[error("Session lifetime out of range: {0} seconds")]
    Lifetime(u64),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_display() {
        assert_eq!(SessionError::NotFound.to_string(), "Session not found");
        assert_eq!(
            SessionError::MissingClaim("Role".to_string()).to_string(),
            "Missing claim: Role"
        );
    }

    #[test]
    fn test_from_storage_error() {
        let err = SessionError::from(StorageError::Storage("redis down".to_string()));
        match err {
            SessionError::Storage(msg) => assert!(msg.contains("redis down")),
            other => panic!("Expected Storage variant, got {other:?}"),
        }
    }

    #[test]
    fn test_error_is_sync_and_send() {
        fn assert_sync_send<T: Sync + Send>() {}
        assert_sync_send::<SessionError>();
    }
}
