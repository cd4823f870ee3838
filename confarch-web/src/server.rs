use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use confarch_web::WebConfig;

pub(crate) fn spawn_http_server(port: u16, app: Router) -> JoinHandle<()> {
    tokio::spawn(async move {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        tracing::info!("HTTP server listening on {}", addr);
        if let Err(e) = axum_server::bind(addr)
            .serve(app.into_make_service())
            .await
        {
            tracing::error!("HTTP server stopped: {}", e);
        }
    })
}

pub(crate) async fn spawn_https_server(
    port: u16,
    config: &WebConfig,
    app: Router,
) -> Result<JoinHandle<()>, std::io::Error> {
    let tls = RustlsConfig::from_pem_file(&config.tls_cert_path, &config.tls_key_path).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("HTTPS server listening on {}", addr);
    Ok(tokio::spawn(async move {
        if let Err(e) = axum_server::bind_rustls(addr, tls)
            .serve(app.into_make_service())
            .await
        {
            tracing::error!("HTTPS server stopped: {}", e);
        }
    }))
}

pub(crate) fn init_tracing(app_name: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("{app_name}=debug,confarch_auth=debug,confarch_auth_axum=debug,tower_http=info")
            .into()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Set RUST_LOG to change verbosity, e.g. RUST_LOG=trace");
}
