//! `/account/*` endpoints. All of them are reachable anonymously.

mod external;
mod login;
mod logout;

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::get,
};
use http::{HeaderMap, StatusCode, header::LOCATION};

use crate::state::AuthState;

const LOGIN_WITH_GOOGLE_PATH: &str = "/account/login-with-google";
const LOGOUT_PATH: &str = "/account/logout";

/// Router for the login, Google sign-in and logout endpoints.
///
/// Routes are absolute, so merge it into the application rather than nesting it.
pub fn account_router(state: AuthState) -> Router {
    Router::new()
        .route(
            &state.login_path,
            get(login::show_login_form).post(login::submit_login),
        )
        .route(LOGIN_WITH_GOOGLE_PATH, get(external::login_with_google))
        .route(&state.google_callback_path, get(external::google_callback))
        .route(LOGOUT_PATH, get(logout::logout).post(logout::logout))
        .with_state(state)
}

/// 302 Found to `location` with the given cookies
fn found(headers: HeaderMap, location: &str) -> Response {
    (StatusCode::FOUND, headers, [(LOCATION, location)]).into_response()
}
