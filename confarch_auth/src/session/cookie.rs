use http::header::HeaderMap;

use crate::session::errors::SessionError;
use crate::session::store::SessionTicket;
use crate::utils::{get_cookie_from_headers, header_remove_cookie, header_set_cookie};

/// Adds the `Set-Cookie` header carrying the ticket's token
pub fn set_session_cookie(
    headers: &mut HeaderMap,
    cookie_name: &str,
    ticket: &SessionTicket,
) -> Result<(), SessionError> {
    header_set_cookie(headers, cookie_name, &ticket.token, ticket.cookie_max_age())?;
    Ok(())
}

/// Adds a `Set-Cookie` header that expires the cookie immediately
pub fn clear_session_cookie(
    headers: &mut HeaderMap,
    cookie_name: &str,
) -> Result<(), SessionError> {
    header_remove_cookie(headers, cookie_name)?;
    Ok(())
}

pub fn session_token_from_headers<'a>(
    headers: &'a HeaderMap,
    cookie_name: &str,
) -> Option<&'a str> {
    get_cookie_from_headers(headers, cookie_name)
}
