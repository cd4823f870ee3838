use std::sync::Arc;
use thiserror::Error;

use confarch_auth::{
    AuthConfig, AuthCoordinator, CacheSessionStore, ConfigError, DataStoreKind, ExternalSession,
    GoogleProvider, InMemoryUserStore, NewUser, OAuth2Error, Principal, SqliteUserStore,
    StorageError, UserError, UserRepository, connect_cache_store, connect_sqlite,
};
use confarch_auth_axum::AuthState;

const SESSION_PREFIX: &str = "session";
const EXTERNAL_PREFIX: &str = "external";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("User store error: {0}")]
    User(#[from] UserError),

    #[error("Identity provider error: {0}")]
    OAuth2(#[from] OAuth2Error),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds every store and the coordinator, and wraps them as router state.
pub async fn build_auth_state(
    config: &AuthConfig,
    seed_demo: bool,
) -> Result<AuthState, StartupError> {
    let cache = connect_cache_store(config.cache_store, &config.cache_store_url).await?;

    let users: Arc<dyn UserRepository> = match config.data_store {
        DataStoreKind::Memory => Arc::new(InMemoryUserStore::new()),
        DataStoreKind::Sqlite => {
            let store = SqliteUserStore::new(connect_sqlite(&config.data_store_url)?);
            store.init().await?;
            Arc::new(store)
        }
    };
    if seed_demo {
        seed_demo_users(users.as_ref()).await?;
    }

    let sessions = Arc::new(CacheSessionStore::<Principal>::new(
        cache.clone(),
        SESSION_PREFIX,
        config.session.ttl,
    ));
    let external = Arc::new(CacheSessionStore::<ExternalSession>::new(
        cache.clone(),
        EXTERNAL_PREFIX,
        config.external.ttl,
    ));

    let mut coordinator = AuthCoordinator::new(
        users,
        sessions,
        config.session.clone(),
        external,
        config.external.clone(),
    );
    match &config.google {
        Some(google) => {
            let provider = GoogleProvider::new(google.clone(), cache)?;
            coordinator = coordinator.with_provider(Arc::new(provider));
        }
        None => tracing::info!("GOOGLE_CLIENT_ID is not set, external login is disabled"),
    }

    Ok(AuthState::new(coordinator, config))
}

/// Demo accounts for local development. Accounts that already exist are left alone.
pub async fn seed_demo_users(users: &dyn UserRepository) -> Result<(), UserError> {
    let demo = [
        NewUser::new("admin", "Administrator", "Admin", "red").with_password("admin"),
        NewUser::new("ada", "Ada", "Speaker", "blue").with_password("analytical"),
        NewUser::new("grace", "Grace", "Attendee", "green").with_password("compiler"),
    ];

    for user in demo {
        let username = user.username.clone();
        match users.add_user(user).await {
            Ok(user) => tracing::info!("Seeded demo user {} (id {})", user.username, user.id),
            Err(UserError::Conflict(_)) => tracing::debug!("Demo user {} already exists", username),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
