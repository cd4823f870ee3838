use confarch_auth::AuthConfig;
use confarch_web::{WebConfig, build_app, build_auth_state, https_redirect_app};

mod server;

use crate::server::{init_tracing, spawn_http_server, spawn_https_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // axum-server needs a process-level CryptoProvider before the TLS config is loaded
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "Failed to install default CryptoProvider")?;

    dotenvy::dotenv().ok();
    init_tracing(env!("CARGO_CRATE_NAME"));

    let auth_config = AuthConfig::from_env()?;
    let web_config = WebConfig::from_env()?;
    tracing::debug!("Starting in {:?} mode", web_config.environment);

    let state = build_auth_state(&auth_config, web_config.seed_demo_users).await?;
    let app = build_app(state, &web_config);

    let http_server = spawn_http_server(
        web_config.http_port,
        https_redirect_app(&auth_config.origin),
    );
    let https_server = spawn_https_server(web_config.https_port, &web_config, app).await?;

    tokio::try_join!(http_server, https_server)?;
    Ok(())
}
