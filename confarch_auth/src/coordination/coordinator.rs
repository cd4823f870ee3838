use http::header::HeaderMap;
use std::sync::Arc;

use crate::coordination::errors::CoordinationError;
use crate::oauth2::{ExternalSession, IdentityProvider};
use crate::session::{
    Principal, SessionConfig, SessionStore, SessionTicket, clear_session_cookie,
    session_token_from_headers, set_session_cookie,
};
use crate::userdb::UserRepository;

/// What the login page needs to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    /// Sanitised return URL to post back with the form
    pub return_url: String,
    /// Display name of the external provider, if one is configured
    pub external_provider: Option<String>,
}

/// A completed step of a flow: cookies to set and where to send the browser
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub headers: HeaderMap,
    pub redirect_to: String,
}

/// Runs the sign-in flows against the user store and the two session stores.
///
/// Everything is handed in by the composition root; nothing is read from
/// global state while a request is being served.
#[derive(Clone)]
pub struct AuthCoordinator {
    pub(super) users: Arc<dyn UserRepository>,
    pub(super) sessions: Arc<dyn SessionStore<Principal>>,
    pub(super) external: Arc<dyn SessionStore<ExternalSession>>,
    pub(super) provider: Option<Arc<dyn IdentityProvider>>,
    pub(super) session_config: SessionConfig,
    pub(super) external_config: SessionConfig,
}

impl AuthCoordinator {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionStore<Principal>>,
        session_config: SessionConfig,
        external: Arc<dyn SessionStore<ExternalSession>>,
        external_config: SessionConfig,
    ) -> Self {
        Self {
            users,
            sessions,
            external,
            provider: None,
            session_config,
            external_config,
        }
    }

    /// Enables the external login flow
    pub fn with_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        tracing::info!("External login enabled with provider {}", provider.name());
        self.provider = Some(provider);
        self
    }

    pub fn external_login_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub fn session_cookie_name(&self) -> &str {
        &self.session_config.cookie_name
    }

    pub fn external_cookie_name(&self) -> &str {
        &self.external_config.cookie_name
    }

    /// `Set-Cookie` headers that drop the external cookie, for failed external sign-ins
    pub fn external_cookie_removal(&self) -> Result<HeaderMap, CoordinationError> {
        let mut headers = HeaderMap::new();
        clear_session_cookie(&mut headers, self.external_cookie_name())?;
        Ok(headers)
    }

    /// Resolves the primary session cookie of a request to its principal
    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<Principal>, CoordinationError> {
        let Some(token) = session_token_from_headers(headers, self.session_cookie_name()) else {
            return Ok(None);
        };
        Ok(self.sessions.validate(token).await?)
    }

    /// Creates the primary session and adds its cookie to `headers`
    pub(super) async fn sign_in(
        &self,
        principal: &Principal,
        persistent: bool,
        headers: &mut HeaderMap,
    ) -> Result<SessionTicket, CoordinationError> {
        let ticket = self.sessions.create(principal, persistent).await?;
        set_session_cookie(headers, self.session_cookie_name(), &ticket)?;

        tracing::info!(
            subject_id = principal.subject_id(),
            persistent,
            "User signed in"
        );
        Ok(ticket)
    }

    /// Drops the primary session the request already carries, if any
    pub(super) async fn discard_current_session(
        &self,
        request_headers: &HeaderMap,
    ) -> Result<(), CoordinationError> {
        if let Some(token) = session_token_from_headers(request_headers, self.session_cookie_name())
        {
            self.sessions.invalidate(token).await?;
        }
        Ok(())
    }
}
