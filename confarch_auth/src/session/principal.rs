use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::errors::SessionError;
use crate::userdb::User;

/// The claims carried by every signed-in principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimType {
    NameIdentifier,
    Name,
    Role,
    FavoriteColor,
}

impl ClaimType {
    pub const ALL: [ClaimType; 4] = [
        ClaimType::NameIdentifier,
        ClaimType::Name,
        ClaimType::Role,
        ClaimType::FavoriteColor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::NameIdentifier => "NameIdentifier",
            ClaimType::Name => "Name",
            ClaimType::Role => "Role",
            ClaimType::FavoriteColor => "FavoriteColor",
        }
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity stored in the primary session.
///
/// Both login flows build it from a [`User`], so it always carries exactly the
/// four claims in [`ClaimType::ALL`], none of them empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    subject_id: String,
    name: String,
    role: String,
    favorite_color: String,
}

impl Principal {
    pub fn try_new(
        subject_id: impl Into<String>,
        name: impl Into<String>,
        role: impl Into<String>,
        favorite_color: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let principal = Self {
            subject_id: subject_id.into(),
            name: name.into(),
            role: role.into(),
            favorite_color: favorite_color.into(),
        };

        if let Some((claim, _)) = principal.claims().iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(SessionError::MissingClaim(claim.to_string()));
        }
        Ok(principal)
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn favorite_color(&self) -> &str {
        &self.favorite_color
    }

    pub fn claim(&self, claim: ClaimType) -> &str {
        match claim {
            ClaimType::NameIdentifier => &self.subject_id,
            ClaimType::Name => &self.name,
            ClaimType::Role => &self.role,
            ClaimType::FavoriteColor => &self.favorite_color,
        }
    }

    pub fn claims(&self) -> [(ClaimType, &str); 4] {
        ClaimType::ALL.map(|claim| (claim, self.claim(claim)))
    }

    pub fn is_in_role(&self, role: &str) -> bool {
        self.role == role
    }
}

impl TryFrom<&User> for Principal {
    type Error = SessionError;

    fn try_from(user: &User) -> Result<Self, Self::Error> {
        Self::try_new(
            user.id.to_string(),
            &user.name,
            &user.role,
            &user.favorite_color,
        )
    }
}
