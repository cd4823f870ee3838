//! Startup configuration read from the environment

use thiserror::Error;

use crate::oauth2::{
    GOOGLE_AUTH_URL, GOOGLE_ISSUER, GOOGLE_JWKS_URL, GOOGLE_SCOPE, GOOGLE_TOKEN_URL, GoogleConfig,
};
use crate::session::SessionConfig;
use crate::storage::{CacheStoreKind, DataStoreKind};

pub const DEFAULT_SESSION_COOKIE_NAME: &str = "__Host-ConfArchSession";
pub const DEFAULT_SESSION_TTL: u64 = 14 * 24 * 60 * 60;
pub const DEFAULT_EXTERNAL_COOKIE_NAME: &str = "__Host-ConfArchExternal";
pub const DEFAULT_EXTERNAL_COOKIE_TTL: u64 = 600;
/// Upper bound for any configured session or cookie lifetime
pub const MAX_TTL: u64 = 365 * 24 * 60 * 60;
pub const DEFAULT_LOGIN_PATH: &str = "/account/login";
pub const DEFAULT_GOOGLE_CALLBACK_PATH: &str = "/account/google-callback";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required variable: {0}")]
    Missing(String),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: String, value: String },
}

/// Everything the authentication stack needs, parsed once at startup
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Public https origin of the site, e.g. `https://localhost:3443`
    pub origin: String,
    /// Where unauthenticated visitors are sent
    pub login_path: String,
    pub session: SessionConfig,
    pub external: SessionConfig,
    pub google_callback_path: String,
    /// `None` when no Google client is configured; external login is then disabled
    pub google: Option<GoogleConfig>,
    pub cache_store: CacheStoreKind,
    pub cache_store_url: String,
    pub data_store: DataStoreKind,
    pub data_store_url: String,
}

impl AuthConfig {
    /// Reads the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads variables through `lookup`; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let get_or = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let origin = get("ORIGIN").ok_or_else(|| ConfigError::Missing("ORIGIN".to_string()))?;
        let origin = origin.trim_end_matches('/').to_string();
        if !origin.starts_with("https://") && !origin.starts_with("http://") {
            return Err(ConfigError::Invalid {
                name: "ORIGIN".to_string(),
                value: origin,
            });
        }

        let login_path = local_path(&get, "LOGIN_PATH", DEFAULT_LOGIN_PATH)?;
        let google_callback_path =
            local_path(&get, "GOOGLE_CALLBACK_PATH", DEFAULT_GOOGLE_CALLBACK_PATH)?;

        let session = SessionConfig::new(
            get_or("SESSION_COOKIE_NAME", DEFAULT_SESSION_COOKIE_NAME),
            parse_ttl(&get, "SESSION_TTL", DEFAULT_SESSION_TTL)?,
        );
        let external = SessionConfig::new(
            get_or("EXTERNAL_COOKIE_NAME", DEFAULT_EXTERNAL_COOKIE_NAME),
            parse_ttl(&get, "EXTERNAL_COOKIE_TTL", DEFAULT_EXTERNAL_COOKIE_TTL)?,
        );

        let google = match (get("GOOGLE_CLIENT_ID"), get("GOOGLE_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(GoogleConfig {
                client_id,
                client_secret,
                auth_url: get_or("OAUTH2_AUTH_URL", GOOGLE_AUTH_URL),
                token_url: get_or("OAUTH2_TOKEN_URL", GOOGLE_TOKEN_URL),
                jwks_url: get_or("OAUTH2_JWKS_URL", GOOGLE_JWKS_URL),
                issuer: get_or("OAUTH2_ISSUER", GOOGLE_ISSUER),
                scope: get_or("OAUTH2_SCOPE", GOOGLE_SCOPE),
                redirect_uri: format!("{origin}{google_callback_path}"),
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::Missing("GOOGLE_CLIENT_SECRET".to_string()));
            }
            (None, Some(_)) => {
                return Err(ConfigError::Missing("GOOGLE_CLIENT_ID".to_string()));
            }
        };

        let cache_store = parse_or(&get, "GENERIC_CACHE_STORE_TYPE", CacheStoreKind::Memory)?;
        let data_store = parse_or(&get, "GENERIC_DATA_STORE_TYPE", DataStoreKind::Memory)?;

        Ok(Self {
            origin,
            login_path,
            session,
            external,
            google_callback_path,
            google,
            cache_store,
            cache_store_url: get_or("GENERIC_CACHE_STORE_URL", ""),
            data_store,
            data_store_url: get_or("GENERIC_DATA_STORE_URL", ""),
        })
    }
}

fn parse_or<T, G>(get: &G, name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name: name.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

/// Lifetimes in seconds, accepted within `1..=MAX_TTL`
fn parse_ttl<G>(get: &G, name: &str, default: u64) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let ttl = parse_or(get, name, default)?;
    if (1..=MAX_TTL).contains(&ttl) {
        Ok(ttl)
    } else {
        Err(ConfigError::Invalid {
            name: name.to_string(),
            value: ttl.to_string(),
        })
    }
}

fn local_path<G>(get: &G, name: &str, default: &str) -> Result<String, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let path = get(name).unwrap_or_else(|| default.to_string());
    if crate::redirect::is_local_url(&path) {
        Ok(path)
    } else {
        Err(ConfigError::Invalid {
            name: name.to_string(),
            value: path,
        })
    }
}
