//! Server-side sessions: the fixed principal record, the token-keyed session
//! stores and the cookies that carry their tokens.

mod config;
mod cookie;
mod errors;
mod principal;
mod store;

pub use config::SessionConfig;
pub use cookie::{clear_session_cookie, session_token_from_headers, set_session_cookie};
pub use errors::SessionError;
pub use principal::{ClaimType, Principal};
pub use store::{CacheSessionStore, SessionStore, SessionTicket};
