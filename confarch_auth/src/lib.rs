//! confarch-auth - sign-in for the ConfArch conference site
//!
//! Local username/password login and Google sign-in, both ending in a
//! server-side session whose opaque token travels in an HttpOnly cookie.
//! The crate is framework-independent; `confarch-auth-axum` mounts it on a
//! router.

mod config;
mod coordination;
mod oauth2;
mod redirect;
mod session;
mod storage;
mod userdb;
mod utils;

pub use config::{
    AuthConfig, ConfigError, DEFAULT_EXTERNAL_COOKIE_NAME, DEFAULT_GOOGLE_CALLBACK_PATH,
    DEFAULT_LOGIN_PATH, DEFAULT_SESSION_COOKIE_NAME,
};

pub use coordination::{AuthCoordinator, CoordinationError, LoginForm, LoginOutcome};

pub use oauth2::{
    AuthResponse, ExternalIdentity, ExternalSession, GoogleConfig, GoogleProvider,
    IdentityProvider, OAuth2Error, PendingChallenge,
};

pub use redirect::{SITE_ROOT, is_local_url, local_redirect_target};

pub use session::{
    CacheSessionStore, ClaimType, Principal, SessionConfig, SessionError, SessionStore,
    SessionTicket,
};

pub use storage::{
    CacheStoreKind, DataStoreKind, SharedCacheStore, StorageError, connect_cache_store,
    connect_sqlite,
};

pub use userdb::{
    InMemoryUserStore, NewUser, SqliteUserStore, User, UserError, UserRepository,
};

pub use utils::UtilError;
