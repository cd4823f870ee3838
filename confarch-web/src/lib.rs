//! ConfArch site: builds the stores and the authentication coordinator from
//! configuration and assembles the HTTP pipeline around them.

mod app;
mod config;
mod handlers;
mod startup;

pub use app::{ERROR_PATH, build_app, https_redirect_app, panic_layer};
pub use config::{AppEnvironment, DEFAULT_HTTP_PORT, DEFAULT_HTTPS_PORT, WebConfig};
pub use startup::{StartupError, build_auth_state, seed_demo_users};
