//! confarch-auth-axum - mounts confarch-auth on an axum application
//!
//! Provides the `/account/*` router, the middleware that resolves the session
//! cookie of every request, the middleware that turns anonymous requests to
//! protected routes into a login redirect, and the [`AuthUser`] extractor.

mod account;
mod error;
mod middleware;
mod session;
mod state;

pub use account::account_router;
pub use error::{ErrorPage, IntoResponseError};
pub use middleware::{authenticate, require_authenticated};
pub use session::{AuthRedirect, AuthUser};
pub use state::AuthState;

pub use confarch_auth::{AuthConfig, AuthCoordinator, Principal};
