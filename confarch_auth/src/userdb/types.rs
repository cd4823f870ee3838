use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user of the conference site
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    /// Database-assigned identifier
    pub id: i64,
    /// Login name for local sign-in
    pub username: String,
    /// Display name
    pub name: String,
    /// Authorization role, e.g. "Admin", "Speaker", "Attendee"
    pub role: String,
    pub favorite_color: String,
    /// Argon2 PHC string; `None` for users who only sign in with Google
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Google subject identifier linked to this user
    pub google_id: Option<String>,
}

/// Input for creating a user. The password is hashed before it is stored.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub role: String,
    pub favorite_color: String,
    pub password: Option<String>,
    pub google_id: Option<String>,
}

impl NewUser {
    pub fn new(username: &str, name: &str, role: &str, favorite_color: &str) -> Self {
        Self {
            username: username.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            favorite_color: favorite_color.to_string(),
            password: None,
            google_id: None,
        }
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    pub fn with_google_id(mut self, google_id: &str) -> Self {
        self.google_id = Some(google_id.to_string());
        self
    }
}
