use std::{str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::storage::errors::StorageError;

use super::redis::RedisCacheStore;
use super::types::{CacheStore, InMemoryCacheStore};

pub type SharedCacheStore = Arc<Mutex<Box<dyn CacheStore>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStoreKind {
    Memory,
    Redis,
}

impl FromStr for CacheStoreKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            t => Err(StorageError::UnsupportedStore(format!(
                "{t}. Supported cache stores are 'memory' and 'redis'"
            ))),
        }
    }
}

/// Builds the cache store selected by configuration and verifies it is reachable
pub async fn connect_cache_store(
    kind: CacheStoreKind,
    url: &str,
) -> Result<SharedCacheStore, StorageError> {
    tracing::info!("Initializing cache store with type: {:?}", kind);

    let store: Box<dyn CacheStore> = match kind {
        CacheStoreKind::Memory => Box::new(InMemoryCacheStore::new()),
        CacheStoreKind::Redis => Box::new(RedisCacheStore::open(url).await?),
    };
    store.init().await?;

    tracing::info!("Connected to cache store: type={:?}", kind);
    Ok(Arc::new(Mutex::new(store)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_store_kind_from_str() {
        assert_eq!("memory".parse::<CacheStoreKind>().unwrap(), CacheStoreKind::Memory);
        assert_eq!("Redis".parse::<CacheStoreKind>().unwrap(), CacheStoreKind::Redis);
        assert!(matches!(
            "memcached".parse::<CacheStoreKind>(),
            Err(StorageError::UnsupportedStore(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_memory_cache_store() {
        let store = connect_cache_store(CacheStoreKind::Memory, "")
            .await
            .expect("memory store always connects");
        let value = store.lock().await.get("session", "missing").await.unwrap();
        assert!(value.is_none());
    }
}
