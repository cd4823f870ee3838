use thiserror::Error;

use crate::storage::StorageError;
use crate::utils::UtilError;

#[derive(Clone, Error, Debug)]
pub enum UserError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("User already exists: {0}")]
    Conflict(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                UserError::Conflict(db.message().to_string())
            }
            _ => UserError::Storage(err.to_string()),
        }
    }
}

impl From<StorageError> for UserError {
    fn from(err: StorageError) -> Self {
        UserError::Storage(err.to_string())
    }
}

impl From<UtilError> for UserError {
    fn from(err: UtilError) -> Self {
        UserError::PasswordHash(err.to_string())
    }
}
