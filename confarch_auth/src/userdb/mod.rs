//! Credential Store: the read side used by the login flows plus the seeding
//! operation used by the composition root and tests.

mod errors;
mod memory;
mod password;
mod sqlite;
mod store;
mod types;

pub use errors::UserError;
pub use memory::InMemoryUserStore;
#[cfg(test)]
pub(crate) use password::{hash_password, verify_password};
pub use sqlite::SqliteUserStore;
pub use store::UserRepository;
pub use types::{NewUser, User};
