use http::header::HeaderMap;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::coordination::coordinator::{AuthCoordinator, LoginOutcome};
use crate::coordination::errors::CoordinationError;
use crate::oauth2::{AuthResponse, ExternalSession, IdentityProvider, PendingChallenge};
use crate::redirect::local_redirect_target;
use crate::session::{
    Principal, clear_session_cookie, session_token_from_headers, set_session_cookie,
};

impl AuthCoordinator {
    fn provider(&self) -> Result<&Arc<dyn IdentityProvider>, CoordinationError> {
        self.provider
            .as_ref()
            .ok_or_else(|| CoordinationError::ExternalLoginDisabled.log())
    }

    fn external_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        session_token_from_headers(headers, self.external_cookie_name())
    }

    /// Rejects the external flow and discards its session
    async fn reject_external(&self, token: &str, reason: &str) -> Result<(), CoordinationError> {
        self.external.invalidate(token).await?;
        Err(CoordinationError::ExternalAuthentication(reason.to_string()).log())
    }

    /// Starts sign-in with the external provider.
    ///
    /// Stashes the sanitised return URL and a fresh challenge in a new
    /// external session and points the browser at the provider.
    #[tracing::instrument(skip(self))]
    pub async fn initiate_external_login(
        &self,
        return_url: Option<&str>,
    ) -> Result<LoginOutcome, CoordinationError> {
        let provider = self.provider()?;

        let challenge = PendingChallenge::generate()?;
        let provider_url = provider.authorization_url(&challenge)?;
        let pending = ExternalSession::pending(
            provider.name(),
            local_redirect_target(return_url),
            challenge,
        );

        let ticket = self.external.create(&pending, true).await?;
        let mut headers = HeaderMap::new();
        set_session_cookie(&mut headers, self.external_cookie_name(), &ticket)?;

        tracing::debug!("Redirecting to {} for sign-in", provider.name());
        Ok(LoginOutcome {
            headers,
            redirect_to: provider_url,
        })
    }

    /// Completes the provider handshake for the external session in `headers`.
    ///
    /// On success the pending challenge in the external session is replaced by
    /// the verified identity. Any failure discards the external session.
    #[tracing::instrument(skip_all)]
    pub async fn complete_external_challenge(
        &self,
        response: &AuthResponse,
        headers: &HeaderMap,
    ) -> Result<(), CoordinationError> {
        let provider = self.provider()?;

        let Some(token) = self.external_token(headers) else {
            return Err(
                CoordinationError::ExternalAuthentication("No external session".to_string()).log(),
            );
        };
        let Some(session) = self.external.validate(token).await? else {
            return Err(CoordinationError::ExternalAuthentication(
                "External session expired".to_string(),
            )
            .log());
        };

        if let Some(error) = &response.error {
            return self
                .reject_external(token, &format!("Provider returned error: {error}"))
                .await;
        }

        let Some(challenge) = session.challenge.as_ref() else {
            return self
                .reject_external(token, "No pending challenge for external session")
                .await;
        };

        let state_matches = response
            .state
            .as_deref()
            .is_some_and(|state| bool::from(state.as_bytes().ct_eq(challenge.state.as_bytes())));
        if !state_matches {
            return self.reject_external(token, "State mismatch").await;
        }

        let Some(code) = response.code.as_deref() else {
            return self
                .reject_external(token, "No authorization code in response")
                .await;
        };

        let identity = match provider.exchange_code(code, challenge).await {
            Ok(identity) => identity,
            Err(err) => {
                self.external.invalidate(token).await?;
                return Err(err.into());
            }
        };

        tracing::debug!("Provider handshake completed for {}", identity.provider);
        self.external
            .update(token, &session.authenticated(identity))
            .await?;
        Ok(())
    }

    /// Signs in the local user linked to the external identity.
    ///
    /// The external session is consumed and replaced by a non-persistent
    /// primary session. Unmapped identities are rejected, never provisioned.
    #[tracing::instrument(skip_all)]
    pub async fn handle_external_callback(
        &self,
        headers: &HeaderMap,
    ) -> Result<LoginOutcome, CoordinationError> {
        self.provider()?;

        let Some(token) = self.external_token(headers) else {
            return Err(
                CoordinationError::ExternalAuthentication("No external session".to_string()).log(),
            );
        };
        let Some(session) = self.external.validate(token).await? else {
            return Err(CoordinationError::ExternalAuthentication(
                "External session expired".to_string(),
            )
            .log());
        };
        let Some(identity) = session.identity else {
            self.external.invalidate(token).await?;
            return Err(
                CoordinationError::ExternalAuthentication("No external identity".to_string()).log(),
            );
        };

        let Some(subject) = identity.subject.filter(|s| !s.is_empty()) else {
            self.external.invalidate(token).await?;
            return Err(CoordinationError::MissingSubjectClaim.log());
        };

        let Some(user) = self.users.get_by_google_id(&subject).await? else {
            self.external.invalidate(token).await?;
            return Err(CoordinationError::NoMappedUser {
                provider: identity.provider,
                subject,
            }
            .log());
        };

        let principal = match Principal::try_from(&user) {
            Ok(principal) => principal,
            Err(err) => {
                self.external.invalidate(token).await?;
                return Err(err.into());
            }
        };

        let mut response_headers = HeaderMap::new();
        self.external.invalidate(token).await?;
        clear_session_cookie(&mut response_headers, self.external_cookie_name())?;

        self.discard_current_session(headers).await?;
        self.sign_in(&principal, false, &mut response_headers).await?;

        Ok(LoginOutcome {
            headers: response_headers,
            redirect_to: local_redirect_target(Some(&session.return_url)),
        })
    }
}
