//! The sign-in flows: local login, external login, logout and per-request
//! authentication, wired to the stores the composition root hands in.

mod coordinator;
mod errors;
mod external;
mod local;
mod logout;

#[cfg(test)]
mod test_utils;

pub use coordinator::{AuthCoordinator, LoginForm, LoginOutcome};
pub use errors::CoordinationError;
