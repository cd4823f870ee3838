mod config;
mod memory;
mod redis;
mod types;

pub use config::{CacheStoreKind, SharedCacheStore, connect_cache_store};
#[cfg(test)]
pub(crate) use types::{CacheStore, InMemoryCacheStore};
