use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::session::{AuthRedirect, AuthUser, LoginPath};
use crate::state::AuthState;

/// Resolves the session cookie and stores the signed-in user in request extensions.
///
/// Never rejects; anonymous requests pass through without an [`AuthUser`].
/// Use with `axum::middleware::from_fn_with_state`.
pub async fn authenticate(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    req.extensions_mut()
        .insert(LoginPath(state.login_path.clone()));

    match state.coordinator.authenticate(req.headers()).await {
        Ok(Some(principal)) => {
            tracing::trace!(subject_id = principal.subject_id(), "Request authenticated");
            req.extensions_mut().insert(AuthUser::from(principal));
        }
        Ok(None) => {}
        Err(e) => {
            // Treated as anonymous so protected routes fall back to the login page
            tracing::error!("Session lookup failed: {}", e);
        }
    }

    next.run(req).await
}

/// Lets only requests carrying an [`AuthUser`] through.
///
/// Anonymous `GET` requests are redirected to the login page with the
/// original path as `returnUrl`; other methods get 401. Must run after
/// [`authenticate`].
pub async fn require_authenticated(req: Request, next: Next) -> Response {
    if req.extensions().get::<AuthUser>().is_some() {
        return next.run(req).await;
    }
    AuthRedirect::new(req.method(), req.uri(), req.extensions()).into_response()
}
