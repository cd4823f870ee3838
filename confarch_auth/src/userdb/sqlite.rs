use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

use crate::userdb::errors::UserError;
use crate::userdb::password::{check_password, hash_password};
use crate::userdb::store::UserRepository;
use crate::userdb::types::{NewUser, User};

const DB_TABLE_USERS: &str = "users";

/// SQLite-backed user store
#[derive(Clone, Debug)]
pub struct SqliteUserStore {
    pool: Pool<Sqlite>,
}

impl SqliteUserStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Creates the users table if it does not exist yet
    pub async fn init(&self) -> Result<(), UserError> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {DB_TABLE_USERS} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                role TEXT NOT NULL,
                favorite_color TEXT NOT NULL,
                password_hash TEXT,
                google_id TEXT UNIQUE
            )
            "#
        ))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl UserRepository for SqliteUserStore {
    #[tracing::instrument(skip(self, password))]
    async fn get_by_username_and_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT * FROM {DB_TABLE_USERS} WHERE username = ?
            "#
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

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
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT * FROM {DB_TABLE_USERS} WHERE google_id = ?
            "#
        ))
        .bind(google_id)
        .fetch_optional(&self.pool)
        .await?;

        tracing::debug!(found = user.is_some(), "Subject lookup completed");
        Ok(user)
    }

    #[tracing::instrument(skip(self, user), fields(username = %user.username))]
    async fn add_user(&self, user: NewUser) -> Result<User, UserError> {
        let password_hash = user.password.as_deref().map(hash_password).transpose()?;

        let stored = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO {DB_TABLE_USERS} (username, name, role, favorite_color, password_hash, google_id)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#
        ))
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.role)
        .bind(&user.favorite_color)
        .bind(&password_hash)
        .bind(&user.google_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = stored.id, "User added");
        Ok(stored)
    }
}
