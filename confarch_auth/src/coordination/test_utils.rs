use async_trait::async_trait;
use http::header::{COOKIE, HeaderMap, SET_COOKIE};
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;

use crate::coordination::AuthCoordinator;
use crate::oauth2::{
    ExternalIdentity, ExternalSession, IdentityProvider, OAuth2Error, PendingChallenge,
};
use crate::session::{CacheSessionStore, Principal, SessionConfig};
use crate::storage::{CacheStore, InMemoryCacheStore, SharedCacheStore};
use crate::userdb::{NewUser, User, UserError, UserRepository, hash_password, verify_password};

pub(super) const SESSION_COOKIE: &str = "__Host-TestSession";
pub(super) const EXTERNAL_COOKIE: &str = "__Host-TestExternal";

/// Fixed users with chosen ids
pub(super) struct StaticUsers(Vec<User>);

#[async_trait]
impl UserRepository for StaticUsers {
    async fn get_by_username_and_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, UserError> {
        Ok(self
            .0
            .iter()
            .find(|u| u.username == username)
            .filter(|u| {
                u.password_hash
                    .as_deref()
                    .is_some_and(|h| verify_password(h, password))
            })
            .cloned())
    }

    async fn get_by_google_id(&self, google_id: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .0
            .iter()
            .find(|u| u.google_id.as_deref() == Some(google_id))
            .cloned())
    }

    async fn add_user(&self, user: NewUser) -> Result<User, UserError> {
        Err(UserError::InvalidData(format!(
            "read-only test store: {}",
            user.username
        )))
    }
}

pub(super) fn ada_principal() -> Principal {
    Principal::try_new("7", "Ada", "Speaker", "blue").unwrap()
}

fn static_users() -> StaticUsers {
    StaticUsers(vec![
        User {
            id: 7,
            username: "ada".to_string(),
            name: "Ada".to_string(),
            role: "Speaker".to_string(),
            favorite_color: "blue".to_string(),
            password_hash: Some(hash_password("analytical").unwrap()),
            google_id: Some("ext-42".to_string()),
        },
        User {
            id: 8,
            username: "nocolor".to_string(),
            name: "No Color".to_string(),
            role: "Attendee".to_string(),
            favorite_color: String::new(),
            password_hash: Some(hash_password("pw").unwrap()),
            google_id: Some("ext-incomplete".to_string()),
        },
    ])
}

/// Provider that answers every code exchange with a fixed result
pub(super) struct ScriptedProvider {
    result: Result<ExternalIdentity, OAuth2Error>,
    pub(super) exchanged_codes: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub(super) fn ok(subject: &str) -> Self {
        Self::with_subject(Some(subject))
    }

    pub(super) fn with_subject(subject: Option<&str>) -> Self {
        Self {
            result: Ok(ExternalIdentity {
                provider: "Google".to_string(),
                subject: subject.map(str::to_string),
                name: Some("Ada L.".to_string()),
                email: Some("ada@example.com".to_string()),
            }),
            exchanged_codes: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn failing(err: OAuth2Error) -> Self {
        Self {
            result: Err(err),
            exchanged_codes: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl IdentityProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Google"
    }

    fn authorization_url(&self, challenge: &PendingChallenge) -> Result<String, OAuth2Error> {
        Ok(format!(
            "https://provider.example/auth?state={}&nonce={}&code_challenge={}",
            challenge.state,
            challenge.nonce,
            challenge.pkce_challenge()
        ))
    }

    async fn exchange_code(
        &self,
        code: &str,
        _challenge: &PendingChallenge,
    ) -> Result<ExternalIdentity, OAuth2Error> {
        self.exchanged_codes
            .lock()
            .expect("lock")
            .push(code.to_string());
        self.result.clone()
    }
}

pub(super) struct TestStores {
    pub(super) sessions: Arc<CacheSessionStore<Principal>>,
    pub(super) external: Arc<CacheSessionStore<ExternalSession>>,
    pub(super) provider: Option<Arc<ScriptedProvider>>,
}

pub(super) async fn test_coordinator(
    provider: Option<ScriptedProvider>,
) -> (AuthCoordinator, TestStores) {
    let cache: SharedCacheStore = Arc::new(AsyncMutex::new(
        Box::new(InMemoryCacheStore::new()) as Box<dyn CacheStore>
    ));
    let sessions = Arc::new(CacheSessionStore::<Principal>::new(
        cache.clone(),
        "session",
        3600,
    ));
    let external = Arc::new(CacheSessionStore::<ExternalSession>::new(
        cache, "external", 600,
    ));

    let mut coordinator = AuthCoordinator::new(
        Arc::new(static_users()),
        sessions.clone(),
        SessionConfig::new(SESSION_COOKIE, 3600),
        external.clone(),
        SessionConfig::new(EXTERNAL_COOKIE, 600),
    );

    let provider = provider.map(Arc::new);
    if let Some(provider) = &provider {
        coordinator = coordinator.with_provider(provider.clone());
    }

    (
        coordinator,
        TestStores {
            sessions,
            external,
            provider,
        },
    )
}

pub(super) fn cookie_headers(name: &str, token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, format!("{name}={token}").parse().unwrap());
    headers
}

/// Value and attributes of the `Set-Cookie` header for `name`
pub(super) fn set_cookie_line(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{name}=")))
        .map(str::to_string)
}

/// Token carried by the `Set-Cookie` header for `name`
pub(super) fn set_cookie_token(headers: &HeaderMap, name: &str) -> Option<String> {
    let line = set_cookie_line(headers, name)?;
    let value = line.split(';').next()?.split_once('=')?.1;
    Some(value.to_string())
}
