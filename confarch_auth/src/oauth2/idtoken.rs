use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::oauth2::config::{GOOGLE_ISSUER, GoogleConfig};
use crate::storage::{CacheData, SharedCacheStore};

const JWKS_CACHE_PREFIX: &str = "jwks";
const JWKS_CACHE_EXPIRATION: i64 = 600;

/// Google's bare-host issuer form, accepted alongside the https one
const GOOGLE_BARE_ISSUER: &str = "accounts.google.com";

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Jwk {
    kty: String,
    kid: String,
    alg: Option<String>,
    n: Option<String>,
    e: Option<String>,
}

/// Claims read from a verified ID token
#[derive(Debug, Deserialize, Clone)]
pub(super) struct IdInfo {
    pub(super) sub: Option<String>,
    pub(super) email: Option<String>,
    pub(super) name: Option<String>,
    pub(super) nonce: Option<String>,
}

#[derive(Error, Debug)]
pub(super) enum TokenVerificationError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("No matching key found in JWKS")]
    NoMatchingKey,
    #[error("Missing key component: {0}")]
    MissingKeyComponent(String),
    #[error("Unsupported algorithm: {0:?}")]
    UnsupportedAlgorithm(Algorithm),
    #[error("JWKS parsing error: {0}")]
    JwksParsing(String),
    #[error("JWKS cache error: {0}")]
    JwksCache(String),
}

impl TokenVerificationError {
    /// True when the failure came from talking to the provider, not from the token
    pub(super) fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct JwksCache {
    jwks: Jwks,
    expires_at: DateTime<Utc>,
}

impl JwksCache {
    fn to_cache_data(&self) -> Result<CacheData, TokenVerificationError> {
        Ok(CacheData {
            value: serde_json::to_string(self)
                .map_err(|e| TokenVerificationError::JwksParsing(e.to_string()))?,
            expires_at: self.expires_at,
        })
    }
}

impl TryFrom<CacheData> for JwksCache {
    type Error = TokenVerificationError;

    fn try_from(cache_data: CacheData) -> Result<Self, Self::Error> {
        serde_json::from_str(&cache_data.value)
            .map_err(|e| TokenVerificationError::JwksParsing(e.to_string()))
    }
}

async fn fetch_jwks(
    client: &reqwest::Client,
    cache: &SharedCacheStore,
    jwks_url: &str,
) -> Result<Jwks, TokenVerificationError> {
    let cached = cache
        .lock()
        .await
        .get(JWKS_CACHE_PREFIX, jwks_url)
        .await
        .map_err(|e| TokenVerificationError::JwksCache(e.to_string()))?;

    if let Some(cached) = cached {
        let jwks_cache: JwksCache = cached.try_into()?;
        if jwks_cache.expires_at > Utc::now() {
            tracing::debug!("Returning valid cached JWKs");
            return Ok(jwks_cache.jwks);
        }
    }

    let jwks: Jwks = client
        .get(jwks_url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    tracing::debug!("JWKs fetched from URL");

    let jwks_cache = JwksCache {
        jwks: jwks.clone(),
        expires_at: Utc::now() + Duration::seconds(JWKS_CACHE_EXPIRATION),
    };

    cache
        .lock()
        .await
        .put_with_ttl(
            JWKS_CACHE_PREFIX,
            jwks_url,
            jwks_cache.to_cache_data()?,
            JWKS_CACHE_EXPIRATION as usize,
        )
        .await
        .map_err(|e| TokenVerificationError::JwksCache(e.to_string()))?;

    Ok(jwks)
}

fn decoding_key(jwk: &Jwk, alg: Algorithm) -> Result<DecodingKey, TokenVerificationError> {
    match alg {
        Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512 if jwk.kty == "RSA" => {
            let n = jwk
                .n
                .as_deref()
                .ok_or(TokenVerificationError::MissingKeyComponent("n".to_string()))?;
            let e = jwk
                .e
                .as_deref()
                .ok_or(TokenVerificationError::MissingKeyComponent("e".to_string()))?;
            Ok(DecodingKey::from_rsa_components(n, e)?)
        }
        alg => Err(TokenVerificationError::UnsupportedAlgorithm(alg)),
    }
}

/// Verifies signature, audience, issuer and expiry of a Google ID token.
///
/// The nonce is returned in [`IdInfo`] for the caller to compare.
pub(super) async fn verify_idtoken(
    token: &str,
    config: &GoogleConfig,
    client: &reqwest::Client,
    cache: &SharedCacheStore,
) -> Result<IdInfo, TokenVerificationError> {
    let header = jsonwebtoken::decode_header(token)?;
    let kid = header
        .kid
        .ok_or(TokenVerificationError::MissingKeyComponent(
            "kid".to_string(),
        ))?;
    tracing::debug!("Algorithm from JWT header: {:?}", header.alg);

    let jwks = fetch_jwks(client, cache, &config.jwks_url).await?;
    let jwk = jwks
        .keys
        .iter()
        .find(|key| key.kid == kid)
        .ok_or(TokenVerificationError::NoMatchingKey)?;
    if let Some(alg) = jwk.alg.as_deref() {
        if alg != format!("{:?}", header.alg) {
            return Err(TokenVerificationError::UnsupportedAlgorithm(header.alg));
        }
    }
    let key = decoding_key(jwk, header.alg)?;

    let mut validation = Validation::new(header.alg);
    validation.set_audience(&[config.client_id.as_str()]);
    if config.issuer == GOOGLE_ISSUER {
        validation.set_issuer(&[config.issuer.as_str(), GOOGLE_BARE_ISSUER]);
    } else {
        validation.set_issuer(&[config.issuer.as_str()]);
    }
    validation.set_required_spec_claims(&["exp", "iss", "aud"]);

    let data = jsonwebtoken::decode::<IdInfo>(token, &key, &validation)?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CacheStore, InMemoryCacheStore};
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    const TEST_KID: &str = "test-key-1";
    const TEST_PRIVATE_KEY: &str = include_str!("testdata/test_rsa_key.pem");
    const TEST_MODULUS: &str = include_str!("testdata/test_jwks_n.txt");

    fn test_config() -> GoogleConfig {
        let mut config = GoogleConfig::new("client-123", "secret", "https://localhost/cb");
        // Unroutable, so any attempt to fetch instead of using the cache fails
        config.jwks_url = "http://127.0.0.1:9/certs".to_string();
        config
    }

    async fn cache_with_test_jwks(config: &GoogleConfig) -> SharedCacheStore {
        let cache: SharedCacheStore = Arc::new(Mutex::new(
            Box::new(InMemoryCacheStore::new()) as Box<dyn CacheStore>
        ));
        let jwks_cache = JwksCache {
            jwks: Jwks {
                keys: vec![Jwk {
                    kty: "RSA".to_string(),
                    kid: TEST_KID.to_string(),
                    alg: Some("RS256".to_string()),
                    n: Some(TEST_MODULUS.trim().to_string()),
                    e: Some("AQAB".to_string()),
                }],
            },
            expires_at: Utc::now() + Duration::seconds(60),
        };
        cache
            .lock()
            .await
            .put_with_ttl(
                JWKS_CACHE_PREFIX,
                &config.jwks_url,
                jwks_cache.to_cache_data().unwrap(),
                60,
            )
            .await
            .unwrap();
        cache
    }

    fn sign(claims: serde_json::Value, kid: &str) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());
        let key = EncodingKey::from_rsa_pem(TEST_PRIVATE_KEY.as_bytes()).expect("test key");
        jsonwebtoken::encode(&header, &claims, &key).expect("sign token")
    }

    fn claims(aud: &str, iss: &str, exp_offset: i64) -> serde_json::Value {
        let now = Utc::now().timestamp();
        json!({
            "iss": iss,
            "aud": aud,
            "sub": "ext-42",
            "email": "ada@example.com",
            "name": "Ada",
            "nonce": "nonce-1",
            "iat": now,
            "exp": now + exp_offset,
        })
    }

    #[tokio::test]
    async fn test_verify_valid_token() {
        let config = test_config();
        let cache = cache_with_test_jwks(&config).await;
        let token = sign(claims("client-123", GOOGLE_BARE_ISSUER, 300), TEST_KID);

        let info = verify_idtoken(&token, &config, &reqwest::Client::new(), &cache)
            .await
            .expect("token should verify");

        assert_eq!(info.sub.as_deref(), Some("ext-42"));
        assert_eq!(info.name.as_deref(), Some("Ada"));
        assert_eq!(info.nonce.as_deref(), Some("nonce-1"));
    }

    #[tokio::test]
    async fn test_verify_rejects_wrong_audience() {
        let config = test_config();
        let cache = cache_with_test_jwks(&config).await;
        let token = sign(claims("someone-else", "https://accounts.google.com", 300), TEST_KID);

        let result = verify_idtoken(&token, &config, &reqwest::Client::new(), &cache).await;
        assert!(matches!(result, Err(TokenVerificationError::Jwt(_))));
    }

    #[tokio::test]
    async fn test_verify_rejects_wrong_issuer() {
        let config = test_config();
        let cache = cache_with_test_jwks(&config).await;
        let token = sign(claims("client-123", "https://evil.example", 300), TEST_KID);

        let result = verify_idtoken(&token, &config, &reqwest::Client::new(), &cache).await;
        assert!(matches!(result, Err(TokenVerificationError::Jwt(_))));
    }

    #[tokio::test]
    async fn test_verify_rejects_expired_token() {
        let config = test_config();
        let cache = cache_with_test_jwks(&config).await;
        // Past the default 60 second leeway
        let token = sign(claims("client-123", GOOGLE_ISSUER, -600), TEST_KID);

        let result = verify_idtoken(&token, &config, &reqwest::Client::new(), &cache).await;
        assert!(matches!(result, Err(TokenVerificationError::Jwt(_))));
    }

    #[tokio::test]
    async fn test_verify_rejects_unknown_kid() {
        let config = test_config();
        let cache = cache_with_test_jwks(&config).await;
        let token = sign(claims("client-123", GOOGLE_ISSUER, 300), "other-key");

        let result = verify_idtoken(&token, &config, &reqwest::Client::new(), &cache).await;
        assert!(matches!(result, Err(TokenVerificationError::NoMatchingKey)));
    }

    #[tokio::test]
    async fn test_verify_rejects_tampered_payload() {
        let config = test_config();
        let cache = cache_with_test_jwks(&config).await;
        let token = sign(claims("client-123", GOOGLE_ISSUER, 300), TEST_KID);
        let other = sign(
            json!({"iss": GOOGLE_ISSUER, "aud": "client-123", "sub": "ext-1", "exp": Utc::now().timestamp() + 300}),
            TEST_KID,
        );

        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        let result = verify_idtoken(&forged, &config, &reqwest::Client::new(), &cache).await;
        assert!(matches!(result, Err(TokenVerificationError::Jwt(_))));
    }

    #[tokio::test]
    async fn test_unreachable_jwks_is_transport_error() {
        let config = test_config();
        let cache: SharedCacheStore = Arc::new(Mutex::new(
            Box::new(InMemoryCacheStore::new()) as Box<dyn CacheStore>
        ));
        let token = sign(claims("client-123", GOOGLE_ISSUER, 300), TEST_KID);

        let err = verify_idtoken(&token, &config, &reqwest::Client::new(), &cache)
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
