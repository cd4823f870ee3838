pub const GOOGLE_PROVIDER_NAME: &str = "Google";
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
pub const GOOGLE_ISSUER: &str = "https://accounts.google.com";
pub const GOOGLE_SCOPE: &str = "openid email profile";

/// Client registration and endpoints for Google sign-in
#[derive(Clone, PartialEq, Eq)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub jwks_url: String,
    pub issuer: String,
    pub scope: String,
    /// Absolute callback URL registered with Google
    pub redirect_uri: String,
}

impl GoogleConfig {
    /// Google's public endpoints with the given client registration
    pub fn new(client_id: &str, client_secret: &str, redirect_uri: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            jwks_url: GOOGLE_JWKS_URL.to_string(),
            issuer: GOOGLE_ISSUER.to_string(),
            scope: GOOGLE_SCOPE.to_string(),
            redirect_uri: redirect_uri.to_string(),
        }
    }
}

impl std::fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("jwks_url", &self.jwks_url)
            .field("issuer", &self.issuer)
            .field("scope", &self.scope)
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}
