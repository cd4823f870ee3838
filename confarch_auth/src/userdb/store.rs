use async_trait::async_trait;

use crate::userdb::errors::UserError;
use crate::userdb::types::{NewUser, User};

/// Lookup contract consumed by the login flows
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Returns the user whose username matches exactly and whose password verifies
    async fn get_by_username_and_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, UserError>;

    /// Returns the user linked to a Google subject identifier
    async fn get_by_google_id(&self, google_id: &str) -> Result<Option<User>, UserError>;

    async fn add_user(&self, user: NewUser) -> Result<User, UserError>;
}
