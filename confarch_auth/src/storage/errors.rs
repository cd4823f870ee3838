use thiserror::Error;

/// Failures of the cache and data stores
#[derive(Debug, Error, Clone)]
pub enum StorageError {
    /// Backend unreachable or the query failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored entry could not be encoded or decoded
    #[error("Malformed cache entry: {0}")]
    Serde(String),

    #[error("Unsupported store type: {0}")]
    UnsupportedStore(String),
}

impl From<redis::RedisError> for StorageError {
    fn from(err: redis::RedisError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
