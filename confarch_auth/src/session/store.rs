use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::marker::PhantomData;

use crate::session::errors::SessionError;
use crate::storage::{CacheData, SharedCacheStore};
use crate::utils::gen_random_string;

const SESSION_TOKEN_BYTES: usize = 32;

/// What the client receives for a newly created session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTicket {
    /// Opaque random token; the only thing the cookie carries
    pub token: String,
    pub persistent: bool,
    pub expires_at: DateTime<Utc>,
    pub max_age: u64,
}

impl SessionTicket {
    /// `Max-Age` for the cookie. Non-persistent sessions get a browser-session cookie.
    pub fn cookie_max_age(&self) -> Option<i64> {
        self.persistent.then(|| i64::try_from(self.max_age).unwrap_or(i64::MAX))
    }
}

/// Token-keyed server-side session storage for payloads of type `T`
#[async_trait]
pub trait SessionStore<T>: Send + Sync + 'static
where
    T: Send + Sync + 'static,
{
    /// Stores `payload` under a fresh random token
    async fn create(&self, payload: &T, persistent: bool) -> Result<SessionTicket, SessionError>;

    /// Returns the payload for a live session, `None` when unknown or expired
    async fn validate(&self, token: &str) -> Result<Option<T>, SessionError>;

    /// Replaces the payload of a live session without extending its lifetime
    async fn update(&self, token: &str, payload: &T) -> Result<(), SessionError>;

    /// Removes the session. Unknown tokens are ignored.
    async fn invalidate(&self, token: &str) -> Result<(), SessionError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession<T> {
    payload: T,
    persistent: bool,
    expires_at: DateTime<Utc>,
}

impl<T: Serialize> StoredSession<T> {
    fn to_cache_data(&self) -> Result<CacheData, SessionError> {
        Ok(CacheData {
            value: serde_json::to_string(self)?,
            expires_at: self.expires_at,
        })
    }
}

impl<T: DeserializeOwned> TryFrom<CacheData> for StoredSession<T> {
    type Error = SessionError;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        Ok(serde_json::from_str(&data.value)?)
    }
}

/// [`SessionStore`] on top of the shared cache store (in-memory or Redis)
pub struct CacheSessionStore<T> {
    cache: SharedCacheStore,
    prefix: String,
    ttl: u64,
    _payload: PhantomData<fn() -> T>,
}

impl<T> CacheSessionStore<T> {
    /// Sessions live under `prefix` in the cache and expire after `ttl` seconds
    pub fn new(cache: SharedCacheStore, prefix: impl Into<String>, ttl: u64) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
            ttl,
            _payload: PhantomData,
        }
    }

    async fn load(&self, token: &str) -> Result<Option<StoredSession<T>>, SessionError>
    where
        T: DeserializeOwned,
    {
        let cached = self.cache.lock().await.get(&self.prefix, token).await?;
        match cached {
            Some(data) => Ok(Some(data.try_into()?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<T> SessionStore<T> for CacheSessionStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn create(&self, payload: &T, persistent: bool) -> Result<SessionTicket, SessionError> {
        let lifetime = i64::try_from(self.ttl)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or(SessionError::Lifetime(self.ttl))?;
        let expires_at = Utc::now()
            .checked_add_signed(lifetime)
            .ok_or(SessionError::Lifetime(self.ttl))?;
        let cache_ttl = usize::try_from(self.ttl).map_err(|_| SessionError::Lifetime(self.ttl))?;
        let token = gen_random_string(SESSION_TOKEN_BYTES)?;

        let stored = StoredSession {
            payload,
            persistent,
            expires_at,
        };

        self.cache
            .lock()
            .await
            .put_with_ttl(
                &self.prefix,
                &token,
                stored.to_cache_data()?,
                cache_ttl,
            )
            .await?;

        tracing::debug!(prefix = %self.prefix, persistent, "Session created");
        Ok(SessionTicket {
            token,
            persistent,
            expires_at,
            max_age: self.ttl,
        })
    }

    async fn validate(&self, token: &str) -> Result<Option<T>, SessionError> {
        let Some(stored) = self.load(token).await? else {
            tracing::debug!(prefix = %self.prefix, "No live session for token");
            return Ok(None);
        };

        if stored.expires_at <= Utc::now() {
            tracing::debug!(prefix = %self.prefix, "Session expired");
            return Ok(None);
        }
        Ok(Some(stored.payload))
    }

    async fn update(&self, token: &str, payload: &T) -> Result<(), SessionError> {
        let stored: StoredSession<T> = self.load(token).await?.ok_or(SessionError::NotFound)?;

        let remaining = (stored.expires_at - Utc::now()).num_seconds();
        if remaining <= 0 {
            return Err(SessionError::NotFound);
        }
        let remaining = usize::try_from(remaining).map_err(|_| SessionError::Lifetime(self.ttl))?;

        let updated = StoredSession {
            payload,
            persistent: stored.persistent,
            expires_at: stored.expires_at,
        };

        self.cache
            .lock()
            .await
            .put_with_ttl(
                &self.prefix,
                token,
                updated.to_cache_data()?,
                remaining,
            )
            .await?;

        tracing::debug!(prefix = %self.prefix, "Session updated");
        Ok(())
    }

    async fn invalidate(&self, token: &str) -> Result<(), SessionError> {
        self.cache.lock().await.remove(&self.prefix, token).await?;
        tracing::debug!(prefix = %self.prefix, "Session invalidated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Principal;
    use crate::storage::{CacheStore, InMemoryCacheStore};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn shared_cache() -> SharedCacheStore {
        Arc::new(Mutex::new(
            Box::new(InMemoryCacheStore::new()) as Box<dyn CacheStore>
        ))
    }

    fn ada() -> Principal {
        Principal::try_new("7", "Ada", "Speaker", "blue").unwrap()
    }

    #[tokio::test]
    async fn test_create_then_validate() {
        let store = CacheSessionStore::<Principal>::new(shared_cache(), "session", 60);

        let ticket = store.create(&ada(), true).await.expect("create session");
        assert!(ticket.persistent);
        assert_eq!(ticket.max_age, 60);
        assert_eq!(ticket.cookie_max_age(), Some(60));

        let payload = store.validate(&ticket.token).await.unwrap();
        assert_eq!(payload, Some(ada()));
    }

    #[tokio::test]
    async fn test_non_persistent_ticket_has_no_cookie_max_age() {
        let store = CacheSessionStore::<Principal>::new(shared_cache(), "session", 60);

        let ticket = store.create(&ada(), false).await.unwrap();
        assert!(!ticket.persistent);
        assert_eq!(ticket.cookie_max_age(), None);
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let store = CacheSessionStore::<Principal>::new(shared_cache(), "session", 60);

        let first = store.create(&ada(), false).await.unwrap();
        let second = store.create(&ada(), false).await.unwrap();
        assert_ne!(first.token, second.token);
    }

    #[tokio::test]
    async fn test_validate_unknown_token() {
        let store = CacheSessionStore::<Principal>::new(shared_cache(), "session", 60);
        assert_eq!(store.validate("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_session_does_not_validate() {
        let store = CacheSessionStore::<Principal>::new(shared_cache(), "session", 0);

        let ticket = store.create(&ada(), true).await.unwrap();
        assert_eq!(store.validate(&ticket.token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_out_of_range_lifetime_is_rejected() {
        let cache = shared_cache();
        let store = CacheSessionStore::<Principal>::new(cache.clone(), "session", u64::MAX);

        let result = store.create(&ada(), true).await;
        assert!(matches!(result, Err(SessionError::Lifetime(u64::MAX))));

        let store = CacheSessionStore::<Principal>::new(cache, "session", 100_000_000_000_000);
        assert!(matches!(
            store.create(&ada(), true).await,
            Err(SessionError::Lifetime(_))
        ));
    }

    #[test]
    fn test_cookie_max_age_saturates() {
        let ticket = SessionTicket {
            token: "t".to_string(),
            persistent: true,
            expires_at: Utc::now(),
            max_age: u64::MAX,
        };
        assert_eq!(ticket.cookie_max_age(), Some(i64::MAX));
    }

    #[tokio::test]
    async fn test_invalidate_is_idempotent() {
        let store = CacheSessionStore::<Principal>::new(shared_cache(), "session", 60);

        let ticket = store.create(&ada(), false).await.unwrap();
        store.invalidate(&ticket.token).await.unwrap();
        store.invalidate(&ticket.token).await.unwrap();

        assert_eq!(store.validate(&ticket.token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_replaces_payload_and_keeps_expiry() {
        let cache = shared_cache();
        let store = CacheSessionStore::<String>::new(cache.clone(), "external", 60);

        let ticket = store.create(&"pending".to_string(), false).await.unwrap();
        store
            .update(&ticket.token, &"authenticated".to_string())
            .await
            .unwrap();

        assert_eq!(
            store.validate(&ticket.token).await.unwrap().as_deref(),
            Some("authenticated")
        );

        let raw = cache
            .lock()
            .await
            .get("external", &ticket.token)
            .await
            .unwrap()
            .expect("session still cached");
        assert_eq!(raw.expires_at, ticket.expires_at);
    }

    #[tokio::test]
    async fn test_update_unknown_token_fails() {
        let store = CacheSessionStore::<String>::new(shared_cache(), "external", 60);
        let result = store.update("missing", &"x".to_string()).await;
        assert!(matches!(result, Err(SessionError::NotFound)));
    }

    #[tokio::test]
    async fn test_prefixes_keep_stores_apart() {
        let cache = shared_cache();
        let primary = CacheSessionStore::<String>::new(cache.clone(), "session", 60);
        let external = CacheSessionStore::<String>::new(cache, "external", 60);

        let ticket = primary.create(&"primary".to_string(), false).await.unwrap();
        assert_eq!(external.validate(&ticket.token).await.unwrap(), None);
    }
}
