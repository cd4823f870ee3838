use thiserror::Error;

use crate::storage::StorageError;
use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum OAuth2Error {
    /// The provider could not be reached or sent an unreadable response
    #[error("Provider transport error: {0}")]
    Transport(String),

    /// The provider refused the authorization code
    #[error("Token exchange error: {0}")]
    TokenExchange(String),

    #[error("Id token error: {0}")]
    IdToken(String),

    #[error("Nonce mismatch")]
    NonceMismatch,

    #[error("Invalid provider URL: {0}")]
    InvalidUrl(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl From<StorageError> for OAuth2Error {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<url::ParseError> for OAuth2Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth2_error_display() {
        assert_eq!(OAuth2Error::NonceMismatch.to_string(), "Nonce mismatch");
        assert_eq!(
            OAuth2Error::Transport("timed out".to_string()).to_string(),
            "Provider transport error: timed out"
        );
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = OAuth2Error::from(url::Url::parse("not a url").unwrap_err());
        assert!(matches!(err, OAuth2Error::InvalidUrl(_)));
    }
}
