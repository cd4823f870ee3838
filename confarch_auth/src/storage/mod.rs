mod cache_store;
mod data_store;
mod errors;
mod types;

pub use cache_store::{CacheStoreKind, SharedCacheStore, connect_cache_store};
#[cfg(test)]
pub(crate) use cache_store::{CacheStore, InMemoryCacheStore};
pub use data_store::{DataStoreKind, connect_sqlite};
pub use errors::StorageError;
pub use types::CacheData;
