use axum::{extract::State, response::Response};
use http::HeaderMap;

use confarch_auth::SITE_ROOT;

use super::found;
use crate::error::ErrorPage;
use crate::state::AuthState;

/// Ends the session and returns to the site root. Idempotent.
pub(super) async fn logout(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<Response, ErrorPage> {
    let response_headers = state.coordinator.logout(&headers).await?;
    Ok(found(response_headers, SITE_ROOT))
}
