mod config;
mod errors;
mod layout;
mod models;
mod render;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::layout::{default_page_config, TextMetricsMeasurer};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{DocumentStore, JsonFileRepository, Workspace};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Vitae v{}", env!("CARGO_PKG_VERSION"));

    // Open the document store (corrupt or missing data falls back to a default document)
    let repo = JsonFileRepository::new(config.data_file.clone());
    info!("Document data file: {}", repo.path().display());
    let store = DocumentStore::open(Box::new(repo));
    let workspace = Workspace::new(store, config.autosave_policy);
    info!("Autosave policy: {:?}", config.autosave_policy);

    // Page geometry shared by measurement and preview
    let page_config = default_page_config();
    info!(
        "Layout page config: {}x{}mm, inner height {:.1}px, content width {:.1}px",
        page_config.page_width_mm,
        page_config.page_height_mm,
        page_config.page_inner_height_px(),
        page_config.content_width_px()
    );

    let state = AppState {
        workspace: Arc::new(Mutex::new(workspace)),
        page_config,
        measurer: Arc::new(TextMetricsMeasurer),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::new()),
    );

    let addr = SocketAddr::new(config.bind_addr, config.port);
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
