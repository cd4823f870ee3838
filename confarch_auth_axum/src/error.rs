use askama::Template;
use axum::response::{Html, IntoResponse, Response};
use http::StatusCode;

use confarch_auth::{CoordinationError, OAuth2Error};

/// Helper trait for converting errors to a standard response error format
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

/// Status code and a message safe to show visitors for every sign-in failure
fn status_and_message(e: &CoordinationError) -> (StatusCode, &'static str) {
    match e {
        CoordinationError::InvalidCredentials => {
            (StatusCode::UNAUTHORIZED, "Invalid username or password.")
        }
        CoordinationError::ExternalAuthentication(_) => (
            StatusCode::UNAUTHORIZED,
            "External sign-in did not complete. Please try again.",
        ),
        CoordinationError::OAuth2Error(OAuth2Error::Transport(_)) => (
            StatusCode::BAD_GATEWAY,
            "The sign-in provider could not be reached. Please try again later.",
        ),
        CoordinationError::OAuth2Error(
            OAuth2Error::TokenExchange(_) | OAuth2Error::IdToken(_) | OAuth2Error::NonceMismatch,
        ) => (
            StatusCode::UNAUTHORIZED,
            "The sign-in provider's answer could not be verified.",
        ),
        CoordinationError::NoMappedUser { .. } => (
            StatusCode::FORBIDDEN,
            "This account is not registered for the conference site.",
        ),
        CoordinationError::ExternalLoginDisabled => {
            (StatusCode::NOT_FOUND, "External sign-in is not available.")
        }
        CoordinationError::MissingSubjectClaim
        | CoordinationError::OAuth2Error(_)
        | CoordinationError::SessionError(_)
        | CoordinationError::UserError(_)
        | CoordinationError::UtilsError(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Sign-in failed because of a server problem.",
        ),
    }
}

impl<T> IntoResponseError<T> for Result<T, CoordinationError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| {
            let (status, message) = status_and_message(&e);
            tracing::debug!("Responding {} to: {}", status, e);
            (status, message.to_string())
        })
    }
}

/// Implementation for askama rendering failures
impl<T> IntoResponseError<T> for Result<T, askama::Error> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
    }
}

#[derive(Template)]
#[template(path = "auth_error.j2", escape = "html")]
struct AuthErrorTemplate<'a> {
    status: u16,
    reason: &'a str,
    message: &'a str,
}

/// HTML error page for failed sign-in attempts
#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub message: String,
}

impl From<(StatusCode, String)> for ErrorPage {
    fn from((status, message): (StatusCode, String)) -> Self {
        Self { status, message }
    }
}

impl From<CoordinationError> for ErrorPage {
    fn from(e: CoordinationError) -> Self {
        let (status, message) = status_and_message(&e);
        tracing::debug!("Responding {} to: {}", status, e);
        Self {
            status,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        let template = AuthErrorTemplate {
            status: self.status.as_u16(),
            reason: self.status.canonical_reason().unwrap_or("Error"),
            message: &self.message,
        };
        match template.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render error page: {}", e);
                (self.status, self.message).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confarch_auth::{SessionError, UserError};

    fn status_of(err: CoordinationError) -> StatusCode {
        let result: Result<(), CoordinationError> = Err(err);
        result.into_response_error().unwrap_err().0
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(CoordinationError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(CoordinationError::ExternalAuthentication("x".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(CoordinationError::MissingSubjectClaim),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(CoordinationError::NoMappedUser {
                provider: "Google".to_string(),
                subject: "ext-99".to_string()
            }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(CoordinationError::ExternalLoginDisabled),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CoordinationError::OAuth2Error(OAuth2Error::Transport(
                "timeout".to_string()
            ))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(CoordinationError::OAuth2Error(OAuth2Error::NonceMismatch)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(CoordinationError::SessionError(SessionError::Storage(
                "down".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(CoordinationError::UserError(UserError::Storage(
                "down".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_do_not_leak_details() {
        let result: Result<(), CoordinationError> = Err(CoordinationError::NoMappedUser {
            provider: "Google".to_string(),
            subject: "ext-99".to_string(),
        });
        let (_, message) = result.into_response_error().unwrap_err();
        assert!(!message.contains("ext-99"));

        let result: Result<(), CoordinationError> = Err(CoordinationError::SessionError(
            SessionError::Storage("redis://secret-host".to_string()),
        ));
        let (_, message) = result.into_response_error().unwrap_err();
        assert!(!message.contains("secret-host"));
    }

    #[test]
    fn test_success_passes_through() {
        let result: Result<&str, CoordinationError> = Ok("fine");
        assert_eq!(result.into_response_error().unwrap(), "fine");
    }

    #[test]
    fn test_error_page_keeps_status() {
        let page = ErrorPage::from((StatusCode::FORBIDDEN, "<b>nope</b>".to_string()));
        let response = page.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
