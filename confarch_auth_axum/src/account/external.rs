use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use http::{HeaderMap, header::SET_COOKIE};

use confarch_auth::{AuthResponse, CoordinationError, LoginOutcome};

use super::found;
use super::login::ReturnUrlQuery;
use crate::error::ErrorPage;
use crate::state::AuthState;

/// Starts Google sign-in: sets the external cookie and redirects to Google
pub(super) async fn login_with_google(
    State(state): State<AuthState>,
    Query(query): Query<ReturnUrlQuery>,
) -> Result<Response, ErrorPage> {
    let outcome = state
        .coordinator
        .initiate_external_login(query.return_url.as_deref())
        .await?;
    Ok(found(outcome.headers, &outcome.redirect_to))
}

/// Callback Google redirects to.
///
/// A request carrying `code`/`state`/`error` first completes the provider
/// handshake into the external session, then the local user is signed in.
/// Failures render the error page and drop the external cookie.
pub(super) async fn google_callback(
    State(state): State<AuthState>,
    Query(response): Query<AuthResponse>,
    headers: HeaderMap,
) -> Response {
    match complete_sign_in(&state, &response, &headers).await {
        Ok(outcome) => found(outcome.headers, &outcome.redirect_to),
        Err(e) => {
            let mut page = ErrorPage::from(e).into_response();
            match state.coordinator.external_cookie_removal() {
                Ok(removal) => {
                    for value in removal.get_all(SET_COOKIE) {
                        page.headers_mut().append(SET_COOKIE, value.clone());
                    }
                }
                Err(e) => tracing::error!("Failed to clear external cookie: {}", e),
            }
            page
        }
    }
}

async fn complete_sign_in(
    state: &AuthState,
    response: &AuthResponse,
    headers: &HeaderMap,
) -> Result<LoginOutcome, CoordinationError> {
    if response.is_provider_response() {
        state
            .coordinator
            .complete_external_challenge(response, headers)
            .await?;
    }
    state.coordinator.handle_external_callback(headers).await
}
