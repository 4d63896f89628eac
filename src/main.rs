//! Zone Editor - static host and zone store for the polygonal zone editor.
//!
//! Serves the single-page editor, persists the drawn zones as one GeoJSON
//! document, and only answers the ingress proxy unless told otherwise.

use std::ffi::OsStr;
use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

mod access;
mod api;
mod assets;
mod config;
mod error;
mod logging;
mod storage;

use crate::access::AccessPolicy;
use crate::api::build_router;
use crate::assets::RouteTable;
use crate::config::{Cli, Options, Paths, Settings, BIND_ADDRESS};
use crate::storage::ZoneStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Origin gate for the protected routes.
    pub policy: AccessPolicy,
    /// Settings resolved at startup.
    pub settings: Arc<Settings>,
    /// Owner of the zone document.
    pub zones: ZoneStore,
    /// Static routes scanned at startup.
    pub assets: Arc<RouteTable>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    logging::init();

    tracing::info!("Starting Zone Editor v{}", env!("CARGO_PKG_VERSION"));

    let paths = Paths::default();

    // Make sure the zone document exists before anything reads it
    let zones = ZoneStore::new(paths.zones_file.clone());
    zones.ensure_initialized().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize zone document");
        anyhow::anyhow!("Zone store error: {}", e)
    })?;

    tracing::info!(path = %zones.path().display(), "Zone document ready");

    // Load configuration
    let options = Options::load(&paths.options_file).map_err(|e| {
        tracing::error!(error = %e, "Failed to load options");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    tracing::info!(
        allow_all_ips = options.allow_all_ips,
        zone_colour = %options.zone_colour,
        "Loaded options"
    );

    let settings = Settings::resolve(&cli, options, paths);
    let policy = AccessPolicy::from_settings(&settings);

    if policy.allows_all() {
        tracing::warn!("Allow all ips is ENABLED - every origin may use the editor");
    } else {
        tracing::info!(allow_all_ips = false, "Allow all ips");
    }

    // Build static routes
    let excluded = settings
        .paths
        .zones_file
        .file_name()
        .unwrap_or(OsStr::new("zones.json"))
        .to_os_string();
    let assets = RouteTable::build(&settings.paths.asset_root, &excluded).map_err(|e| {
        tracing::error!(error = %e, "Failed to build static routes");
        anyhow::anyhow!("Asset error: {}", e)
    })?;

    if assets.is_empty() {
        tracing::warn!(
            asset_root = %settings.paths.asset_root.display(),
            "No static assets found"
        );
    }
    for entry in assets.entries() {
        tracing::debug!(path = %entry.path, file = %entry.file.display(), "Static route");
    }

    let state = AppState {
        policy,
        settings: Arc::new(settings),
        zones,
        assets: Arc::new(assets),
    };

    let app = build_router(state);

    // Start server
    let listener = TcpListener::bind(BIND_ADDRESS).await?;

    tracing::info!(address = %BIND_ADDRESS, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
