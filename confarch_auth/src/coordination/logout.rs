use http::header::HeaderMap;

use crate::coordination::coordinator::AuthCoordinator;
use crate::coordination::errors::CoordinationError;
use crate::session::{clear_session_cookie, session_token_from_headers};

impl AuthCoordinator {
    /// Ends the primary session, if any, and returns headers that clear its cookie.
    ///
    /// Safe to call any number of times, with or without a session.
    #[tracing::instrument(skip_all)]
    pub async fn logout(
        &self,
        request_headers: &HeaderMap,
    ) -> Result<HeaderMap, CoordinationError> {
        if let Some(token) = session_token_from_headers(request_headers, self.session_cookie_name())
        {
            self.sessions.invalidate(token).await?;
            tracing::info!("User signed out");
        } else {
            tracing::debug!("Logout without a session cookie");
        }

        let mut headers = HeaderMap::new();
        clear_session_cookie(&mut headers, self.session_cookie_name())?;
        Ok(headers)
    }
}
