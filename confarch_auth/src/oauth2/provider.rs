use async_trait::async_trait;

use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::types::{ExternalIdentity, PendingChallenge};

/// An OpenID Connect provider the external login flow can redirect to
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Display name, also stored in the external session
    fn name(&self) -> &str;

    /// URL the browser is sent to for sign-in
    fn authorization_url(&self, challenge: &PendingChallenge) -> Result<String, OAuth2Error>;

    /// Redeems an authorization code and returns the verified identity
    async fn exchange_code(
        &self,
        code: &str,
        challenge: &PendingChallenge,
    ) -> Result<ExternalIdentity, OAuth2Error>;
}
