use http::header::HeaderMap;

use crate::coordination::coordinator::{AuthCoordinator, LoginForm, LoginOutcome};
use crate::coordination::errors::CoordinationError;
use crate::redirect::local_redirect_target;
use crate::session::Principal;

impl AuthCoordinator {
    pub fn login_form(&self, return_url: Option<&str>) -> LoginForm {
        LoginForm {
            return_url: local_redirect_target(return_url),
            external_provider: self.provider.as_ref().map(|p| p.name().to_string()),
        }
    }

    /// Signs in with username and password.
    ///
    /// A session cookie is issued only on success, `remember_login` selects a
    /// persistent cookie. Failure never says which field was wrong.
    #[tracing::instrument(skip(self, request_headers, password, return_url))]
    pub async fn submit_login(
        &self,
        request_headers: &HeaderMap,
        username: &str,
        password: &str,
        remember_login: bool,
        return_url: Option<&str>,
    ) -> Result<LoginOutcome, CoordinationError> {
        let user = self
            .users
            .get_by_username_and_password(username, password)
            .await?
            .ok_or_else(|| CoordinationError::InvalidCredentials.log())?;

        let principal = Principal::try_from(&user)?;

        self.discard_current_session(request_headers).await?;

        let mut headers = HeaderMap::new();
        self.sign_in(&principal, remember_login, &mut headers).await?;

        Ok(LoginOutcome {
            headers,
            redirect_to: local_redirect_target(return_url),
        })
    }
}
