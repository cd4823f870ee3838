use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::oauth2::errors::OAuth2Error;
use crate::utils::{base64url_encode, gen_random_string};

const CHALLENGE_TOKEN_BYTES: usize = 32;

/// Query parameters Google sends to the callback
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl AuthResponse {
    /// True when the request carries a provider answer rather than a bare callback
    pub fn is_provider_response(&self) -> bool {
        self.code.is_some() || self.state.is_some() || self.error.is_some()
    }
}

/// Values bound to one authorization request
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingChallenge {
    pub state: String,
    pub nonce: String,
    pub pkce_verifier: String,
}

impl PendingChallenge {
    pub fn generate() -> Result<Self, OAuth2Error> {
        Ok(Self {
            state: gen_random_string(CHALLENGE_TOKEN_BYTES)?,
            nonce: gen_random_string(CHALLENGE_TOKEN_BYTES)?,
            pkce_verifier: gen_random_string(CHALLENGE_TOKEN_BYTES)?,
        })
    }

    /// S256 code challenge derived from the verifier
    pub fn pkce_challenge(&self) -> String {
        base64url_encode(&Sha256::digest(self.pkce_verifier.as_bytes()))
    }
}

impl std::fmt::Debug for PendingChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingChallenge").finish_non_exhaustive()
    }
}

/// Who the provider says signed in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub provider: String,
    /// Provider subject identifier (`sub`); absent if the token carried none
    pub subject: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Short-lived state of one external sign-in, kept in the external session store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalSession {
    pub provider: String,
    /// Sanitised local path to return to after sign-in
    pub return_url: String,
    /// Present until the provider has redirected back
    pub challenge: Option<PendingChallenge>,
    /// Present once the provider handshake has completed
    pub identity: Option<ExternalIdentity>,
}

impl ExternalSession {
    pub fn pending(provider: &str, return_url: String, challenge: PendingChallenge) -> Self {
        Self {
            provider: provider.to_string(),
            return_url,
            challenge: Some(challenge),
            identity: None,
        }
    }

    /// Swaps the pending challenge for the verified identity
    pub fn authenticated(self, identity: ExternalIdentity) -> Self {
        Self {
            challenge: None,
            identity: Some(identity),
            ..self
        }
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
pub(super) struct OidcTokenResponse {
    pub(super) id_token: Option<String>,
}
