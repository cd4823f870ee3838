use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use http::header::{COOKIE, HeaderMap, SET_COOKIE};
use ring::rand::SecureRandom;
use thiserror::Error;

pub(crate) fn base64url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

pub(crate) fn gen_random_bytes(len: usize) -> Result<Vec<u8>, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| UtilError::Crypto("Failed to generate random bytes".to_string()))?;
    Ok(bytes)
}

/// Random url-safe token built from `len` bytes of system randomness
pub fn gen_random_string(len: usize) -> Result<String, UtilError> {
    Ok(base64url_encode(&gen_random_bytes(len)?))
}

/// Appends a `Set-Cookie` header for a host-wide, HttpOnly, Secure cookie.
///
/// `max_age` of `None` issues a browser-session cookie.
pub(crate) fn header_set_cookie(
    headers: &mut HeaderMap,
    name: &str,
    value: &str,
    max_age: Option<i64>,
) -> Result<(), UtilError> {
    let mut cookie = format!("{name}={value}; SameSite=Lax; Secure; HttpOnly; Path=/");
    if let Some(max_age) = max_age {
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }
    tracing::trace!("Set-Cookie: {}", name);
    headers.append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| UtilError::Cookie(format!("Failed to build cookie {name}")))?,
    );
    Ok(())
}

pub(crate) fn header_remove_cookie(headers: &mut HeaderMap, name: &str) -> Result<(), UtilError> {
    header_set_cookie(headers, name, "value", Some(-86400))
}

/// Finds the value of cookie `name` in the request's `Cookie` headers
pub fn get_cookie_from_headers<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name && !value.is_empty()).then_some(value)
        })
}

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Cookie error: {0}")]
    Cookie(String),
}
