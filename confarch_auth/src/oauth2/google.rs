use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::oauth2::config::{GOOGLE_PROVIDER_NAME, GoogleConfig};
use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::idtoken::verify_idtoken;
use crate::oauth2::provider::IdentityProvider;
use crate::oauth2::types::{ExternalIdentity, OidcTokenResponse, PendingChallenge};
use crate::storage::SharedCacheStore;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Google OpenID Connect client using the authorization code flow with PKCE
pub struct GoogleProvider {
    config: GoogleConfig,
    client: reqwest::Client,
    cache: SharedCacheStore,
}

impl GoogleProvider {
    /// `cache` holds the provider's signing keys between requests
    pub fn new(config: GoogleConfig, cache: SharedCacheStore) -> Result<Self, OAuth2Error> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| OAuth2Error::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            cache,
        })
    }

    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    async fn exchange_code_for_token(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<String, OAuth2Error> {
        let response = self
            .client
            .post(self.config.token_url.as_str())
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
                ("code_verifier", code_verifier),
            ])
            .send()
            .await
            .map_err(|e| OAuth2Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Token exchange rejected with status {}", status);
            return Err(if status.is_server_error() {
                OAuth2Error::Transport(status.to_string())
            } else {
                OAuth2Error::TokenExchange(status.to_string())
            });
        }

        let token_response: OidcTokenResponse = response
            .json()
            .await
            .map_err(|e| OAuth2Error::Transport(e.to_string()))?;

        token_response.id_token.ok_or_else(|| {
            OAuth2Error::TokenExchange("ID token not present in response".to_string())
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn name(&self) -> &str {
        GOOGLE_PROVIDER_NAME
    }

    fn authorization_url(&self, challenge: &PendingChallenge) -> Result<String, OAuth2Error> {
        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", self.config.scope.as_str()),
                ("state", challenge.state.as_str()),
                ("nonce", challenge.nonce.as_str()),
                ("code_challenge", challenge.pkce_challenge().as_str()),
                ("code_challenge_method", "S256"),
            ],
        )?;
        Ok(url.into())
    }

    #[tracing::instrument(skip_all)]
    async fn exchange_code(
        &self,
        code: &str,
        challenge: &PendingChallenge,
    ) -> Result<ExternalIdentity, OAuth2Error> {
        let id_token = self
            .exchange_code_for_token(code, &challenge.pkce_verifier)
            .await?;

        let idinfo = verify_idtoken(&id_token, &self.config, &self.client, &self.cache)
            .await
            .map_err(|e| {
                if e.is_transport() {
                    OAuth2Error::Transport(e.to_string())
                } else {
                    OAuth2Error::IdToken(e.to_string())
                }
            })?;

        if idinfo.nonce.as_deref() != Some(challenge.nonce.as_str()) {
            tracing::warn!("Nonce in ID token does not match the pending challenge");
            return Err(OAuth2Error::NonceMismatch);
        }

        tracing::debug!("ID token verified");
        Ok(ExternalIdentity {
            provider: GOOGLE_PROVIDER_NAME.to_string(),
            subject: idinfo.sub.filter(|sub| !sub.is_empty()),
            name: idinfo.name,
            email: idinfo.email,
        })
    }
}
