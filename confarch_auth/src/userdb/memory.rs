use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::userdb::errors::UserError;
use crate::userdb::password::{check_password, hash_password};
use crate::userdb::store::UserRepository;
use crate::userdb::types::{NewUser, User};

/// Process-local user store for development and tests
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    #[tracing::instrument(skip(self, password))]
    async fn get_by_username_and_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, UserError> {
        let user = {
            let users = self.users.read().await;
            users.iter().find(|u| u.username == username).cloned()
        };
        let stored = user.as_ref().and_then(|u| u.password_hash.clone());
        let user = if check_password(stored, password).await? {
            user
        } else {
            None
        };

        tracing::debug!(found = user.is_some(), "Credential lookup completed");
        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_google_id(&self, google_id: &str) -> Result<Option<User>, UserError> {
        let users = self.users.read().await;
        let user = users
            .iter()
            .find(|u| u.google_id.as_deref() == Some(google_id))
            .cloned();

        tracing::debug!(found = user.is_some(), "Subject lookup completed");
        Ok(user)
    }

    #[tracing::instrument(skip(self, user), fields(username = %user.username))]
    async fn add_user(&self, user: NewUser) -> Result<User, UserError> {
        let password_hash = user.password.as_deref().map(hash_password).transpose()?;

        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(UserError::Conflict(user.username));
        }
        if let Some(google_id) = &user.google_id {
            if users.iter().any(|u| u.google_id.as_ref() == Some(google_id)) {
                return Err(UserError::Conflict(google_id.clone()));
            }
        }

        let stored = User {
            id: users.iter().map(|u| u.id).max().unwrap_or(0) + 1,
            username: user.username,
            name: user.name,
            role: user.role,
            favorite_color: user.favorite_color,
            password_hash,
            google_id: user.google_id,
        };
        users.push(stored.clone());

        tracing::info!(user_id = stored.id, "User added");
        Ok(stored)
    }
}
