use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{self, AppState};
use crate::catalog::FeaturedCatalog;
use crate::completion::GroqClient;
use crate::config::{ServerConfig, TrekPlanConfig};
use crate::planner::PlannerService;

/// In-flight requests get this long to finish after a shutdown signal
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Wire the completion client, planner and catalog from configuration
pub fn build_state(config: &TrekPlanConfig) -> Result<AppState> {
    let provider = GroqClient::new(&config.completion)
        .context("Failed to set up the completion provider")?;
    info!("Completion provider {} at {}", config.completion.provider_name, provider.url());

    let planner = PlannerService::new(Arc::new(provider), config.planner.clone());
    let catalog = FeaturedCatalog::from_config(&config.catalog)
        .context("Failed to set up the featured catalog")?;
    if catalog.is_none() {
        info!("No catalog configured, featured endpoints are disabled");
    }

    Ok(AppState::new(planner, catalog))
}

/// The full application: `/api` routes plus the optional static frontend
pub fn app(state: AppState, server: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new().nest("/api", api::router(state));
    if let Some(dir) = &server.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(RequestBodyLimitLayer::new(server.body_limit_kb * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn shutdown_on_ctrl_c(handle: Handle) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutting down, waiting for in-flight requests to complete...");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

pub async fn run(config: TrekPlanConfig) -> Result<()> {
    let state = build_state(&config)?;
    let app = app(state, &config.server);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let handle = Handle::new();
    tokio::spawn(shutdown_on_ctrl_c(handle.clone()));

    match (&config.server.tls_cert, &config.server.tls_key) {
        (Some(cert), Some(key)) => serve_tls(addr, app, handle, cert, key).await,
        _ => {
            info!("Web server running at http://{}", addr);
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("Web server failed")
        }
    }
}

#[cfg(feature = "tls")]
async fn serve_tls(
    addr: SocketAddr,
    app: Router,
    handle: Handle,
    cert: &std::path::Path,
    key: &std::path::Path,
) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    // Several rustls providers end up linked; pin ring before any TLS setup
    let _ = rustls::crypto::ring::default_provider().install_default();

    let tls = RustlsConfig::from_pem_file(cert, key)
        .await
        .with_context(|| format!("Failed to load TLS certificate {}", cert.display()))?;

    info!("Web server running at https://{}", addr);
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .context("Web server failed")
}

#[cfg(not(feature = "tls"))]
async fn serve_tls(
    _addr: SocketAddr,
    _app: Router,
    _handle: Handle,
    _cert: &std::path::Path,
    _key: &std::path::Path,
) -> Result<()> {
    anyhow::bail!("TLS certificate configured but trekplan was built without the `tls` feature")
}
