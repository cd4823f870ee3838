use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use super::errors::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataStoreKind {
    Memory,
    Sqlite,
}

impl FromStr for DataStoreKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            t => Err(StorageError::UnsupportedStore(format!(
                "{t}. Supported data stores are 'memory' and 'sqlite'"
            ))),
        }
    }
}

/// Opens a lazily-connected SQLite pool, creating the database file if needed
pub fn connect_sqlite(url: &str) -> Result<SqlitePool, StorageError> {
    let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

    // An in-memory database lives only as long as its single connection
    let pool = if url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    tracing::info!("Connecting to sqlite data store");
    Ok(pool.connect_lazy_with(opts))
}
