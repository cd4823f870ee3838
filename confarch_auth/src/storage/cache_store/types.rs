use async_trait::async_trait;
use std::collections::HashMap;

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

pub struct InMemoryCacheStore {
    pub(super) entry: HashMap<String, CacheData>,
}

/// Key/value storage with expiry, shared by the session stores and the JWKS cache
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Initialize the store. This is called when the store is created.
    async fn init(&self) -> Result<(), StorageError>;

    /// Put a value into the store, expiring after `ttl` seconds.
    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError>;

    /// Get a value from the store. Expired values are never returned.
    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError>;

    /// Remove a value from the store. Removing a missing key is not an error.
    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError>;
}
