use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

use super::types::CacheStore;

/// Keys live under `confarch:<prefix>:<key>` so one Redis can host other apps
const KEY_NAMESPACE: &str = "confarch";

/// Cache entries in Redis. Entries carry their own expiry and Redis drops them via `SETEX`.
pub struct RedisCacheStore {
    conn: MultiplexedConnection,
}

impl RedisCacheStore {
    /// Opens one multiplexed connection that every request clones
    pub async fn open(url: &str) -> Result<Self, StorageError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn })
    }

    fn make_key(prefix: &str, key: &str) -> String {
        format!("{KEY_NAMESPACE}:{prefix}:{key}")
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::debug!("Redis answered {}", pong);
        Ok(())
    }

    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_string(&value)?;
        // SETEX rejects a zero expiry
        let seconds = ttl.max(1) as u64;
        let _: () = self
            .conn
            .set_ex(Self::make_key(prefix, key), json, seconds)
            .await?;
        Ok(())
    }

    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        let mut conn = self.conn.clone();
        let stored: Option<String> = conn.get(Self::make_key(prefix, key)).await?;

        let Some(json) = stored else {
            return Ok(None);
        };
        let data: CacheData = serde_json::from_str(&json)?;
        Ok((!data.is_expired()).then_some(data))
    }

    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError> {
        let _: () = self.conn.del(Self::make_key(prefix, key)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_namespaced() {
        assert_eq!(
            RedisCacheStore::make_key("external", "abc"),
            "confarch:external:abc"
        );
    }

    #[tokio::test]
    async fn test_open_rejects_malformed_url() {
        let result = RedisCacheStore::open("not a redis url").await;
        assert!(matches!(result, Err(StorageError::Storage(_))));
    }
}
