//! Error types for the sign-in flows

use thiserror::Error;

use crate::oauth2::OAuth2Error;
use crate::session::SessionError;
use crate::userdb::UserError;
use crate::utils::UtilError;

/// Errors that can occur during authentication coordination
#[derive(Error, Debug)]
pub enum CoordinationError {
    /// Username and password did not match a user
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The external scheme produced no usable identity
    #[error("External authentication failed: {0}")]
    ExternalAuthentication(String),

    /// The provider identity carried no subject identifier
    #[error("External identity has no subject claim")]
    MissingSubjectClaim,

    /// The provider identity is valid but linked to no local user
    #[error("No local user for {provider} subject {subject}")]
    NoMappedUser { provider: String, subject: String },

    /// No external provider is configured
    #[error("External login is not configured")]
    ExternalLoginDisabled,

    /// Error from the user database operations
    #[error("User error: {0}")]
    UserError(UserError),

    /// Error from OAuth2 operations
    #[error("OAuth2 error: {0}")]
    OAuth2Error(OAuth2Error),

    /// Error from Session operations
    #[error("Session error: {0}")]
    SessionError(SessionError),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    UtilsError(UtilError),
}

impl CoordinationError {
    /// Log the error and return self
    ///
    /// Rejections caused by the visitor are logged as warnings, everything
    /// else as errors.
    pub fn log(self) -> Self {
        match &self {
            Self::InvalidCredentials => tracing::warn!("Invalid username or password"),
            Self::ExternalAuthentication(msg) => {
                tracing::warn!("External authentication failed: {}", msg)
            }
            Self::MissingSubjectClaim => tracing::error!("External identity has no subject claim"),
            Self::NoMappedUser { provider, subject } => {
                tracing::warn!("No local user for {} subject {}", provider, subject)
            }
            Self::ExternalLoginDisabled => tracing::warn!("External login is not configured"),
            Self::UserError(err) => tracing::error!("User error: {}", err),
            Self::OAuth2Error(err) => tracing::error!("OAuth2 error: {}", err),
            Self::SessionError(err) => tracing::error!("Session error: {}", err),
            Self::UtilsError(err) => tracing::error!("Utils error: {}", err),
        }
        self
    }
}

// Custom From implementations that automatically log errors

impl From<OAuth2Error> for CoordinationError {
    fn from(err: OAuth2Error) -> Self {
        let error = Self::OAuth2Error(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<SessionError> for CoordinationError {
    fn from(err: SessionError) -> Self {
        let error = Self::SessionError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<UserError> for CoordinationError {
    fn from(err: UserError) -> Self {
        let error = Self::UserError(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<UtilError> for CoordinationError {
    fn from(err: UtilError) -> Self {
        let error = Self::UtilsError(err);
        tracing::error!("{}", error);
        error
    }
}
