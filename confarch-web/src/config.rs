//! Settings of the site binary itself; authentication settings live in [`AuthConfig`](confarch_auth::AuthConfig)

use confarch_auth::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_HTTP_PORT: u16 = 3001;
pub const DEFAULT_HTTPS_PORT: u16 = 3443;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Production,
}

impl FromStr for AppEnvironment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebConfig {
    pub environment: AppEnvironment,
    pub http_port: u16,
    pub https_port: u16,
    pub tls_cert_path: PathBuf,
    pub tls_key_path: PathBuf,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Inserts the demo accounts at startup
    pub seed_demo_users: bool,
}

impl WebConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads variables through `lookup`; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let path_or = |name: &str, default: PathBuf| {
            get(name).map(PathBuf::from).unwrap_or(default)
        };

        Ok(Self {
            environment: parse_or(&get, "APP_ENVIRONMENT", AppEnvironment::Production)?,
            http_port: parse_or(&get, "HTTP_PORT", DEFAULT_HTTP_PORT)?,
            https_port: parse_or(&get, "HTTPS_PORT", DEFAULT_HTTPS_PORT)?,
            tls_cert_path: path_or(
                "TLS_CERT_PATH",
                manifest_dir.join("self_signed_certs").join("cert.pem"),
            ),
            tls_key_path: path_or(
                "TLS_KEY_PATH",
                manifest_dir.join("self_signed_certs").join("key.pem"),
            ),
            static_dir: manifest_dir.join("static"),
            seed_demo_users: parse_flag(&get, "SEED_DEMO_USERS")?,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == AppEnvironment::Development
    }
}

fn parse_or<T, G>(get: &G, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
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

fn parse_flag<G>(get: &G, name: &str) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name).map(|v| v.trim().to_lowercase()) {
        None => Ok(false),
        Some(v) if matches!(v.as_str(), "true" | "1" | "yes") => Ok(true),
        Some(v) if matches!(v.as_str(), "false" | "0" | "no") => Ok(false),
        Some(value) => Err(ConfigError::Invalid {
            name: name.to_string(),
            value,
        }),
    }
}
