use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, OriginalUri},
    response::{IntoResponse, Response},
};
use http::{Extensions, Method, StatusCode, Uri, header::LOCATION, request::Parts};
use std::convert::Infallible;

use confarch_auth::{DEFAULT_LOGIN_PATH, Principal};

/// Login path of the application, placed in request extensions by the
/// authentication middleware
#[derive(Clone, Debug)]
pub(crate) struct LoginPath(pub(crate) String);

/// Rejection for requests that need a signed-in user
#[derive(Debug)]
pub struct AuthRedirect {
    method: Method,
    login_url: String,
}

impl AuthRedirect {
    pub(crate) fn new(method: &Method, uri: &Uri, extensions: &Extensions) -> Self {
        let original = extensions
            .get::<OriginalUri>()
            .map(|OriginalUri(uri)| uri)
            .unwrap_or(uri);
        let return_url = original
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let login_path = extensions
            .get::<LoginPath>()
            .map(|LoginPath(path)| path.as_str())
            .unwrap_or(DEFAULT_LOGIN_PATH);

        Self {
            method: method.clone(),
            login_url: format!(
                "{}?returnUrl={}",
                login_path,
                urlencoding::encode(return_url)
            ),
        }
    }
}

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        if self.method == Method::GET || self.method == Method::HEAD {
            tracing::debug!("Redirecting to {}", self.login_url);
            (StatusCode::FOUND, [(LOCATION, self.login_url)]).into_response()
        } else {
            tracing::debug!("Unauthorized");
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
    }
}

/// Signed-in user, available as an axum extractor behind the
/// [`authenticate`](crate::authenticate) middleware.
///
/// ```no_run
/// use confarch_auth_axum::AuthUser;
///
/// async fn hello(user: AuthUser) -> String {
///     format!("Hello, {}!", user.name)
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub subject_id: String,
    pub name: String,
    pub role: String,
    pub favorite_color: String,
}

impl AuthUser {
    /// Claim name and value pairs, in a fixed order
    pub fn claims(&self) -> [(&'static str, &str); 4] {
        [
            ("NameIdentifier", self.subject_id.as_str()),
            ("Name", self.name.as_str()),
            ("Role", self.role.as_str()),
            ("FavoriteColor", self.favorite_color.as_str()),
        ]
    }
}

impl From<Principal> for AuthUser {
    fn from(principal: Principal) -> Self {
        Self {
            subject_id: principal.subject_id().to_string(),
            name: principal.name().to_string(),
            role: principal.role().to_string(),
            favorite_color: principal.favorite_color().to_string(),
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AuthRedirect::new(&parts.method, &parts.uri, &parts.extensions))
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<AuthUser>().cloned())
    }
}
