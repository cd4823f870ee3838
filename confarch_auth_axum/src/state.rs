use confarch_auth::{AuthConfig, AuthCoordinator};

/// Router state shared by the account handlers and the middleware
#[derive(Clone)]
pub struct AuthState {
    pub coordinator: AuthCoordinator,
    pub login_path: String,
    pub google_callback_path: String,
}

impl AuthState {
    pub fn new(coordinator: AuthCoordinator, config: &AuthConfig) -> Self {
        Self {
            coordinator,
            login_path: config.login_path.clone(),
            google_callback_path: config.google_callback_path.clone(),
        }
    }
}
