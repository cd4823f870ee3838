//! External sign-in with Google: authorization request, code exchange and
//! ID token verification behind the [`IdentityProvider`] seam.

mod config;
mod errors;
mod google;
mod idtoken;
mod provider;
mod types;

pub use config::{
    GOOGLE_AUTH_URL, GOOGLE_ISSUER, GOOGLE_JWKS_URL, GOOGLE_SCOPE, GOOGLE_TOKEN_URL, GoogleConfig,
};
pub use errors::OAuth2Error;
pub use google::GoogleProvider;
pub use provider::IdentityProvider;
pub use types::{AuthResponse, ExternalIdentity, ExternalSession, PendingChallenge};
