//! The roomcast HTTP server.
//!
//! Serves the dashboard JSON API: tenant credential intake, the room
//! registry, and per-room agendas. All state lives on disk under the
//! platform data directory; the process itself is stateless enough to
//! restart at will.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use roomcast_api::TransportConfig;
use roomcast_config::{ConfigStore, SecretCodec};
use roomcast_core::{ConnectionManager, GraphConnector, RoomRegistry};

use roomcast_server::routes;
use roomcast_server::state::AppState;

const ADDR_ENV: &str = "ROOMCAST_ADDR";
const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,roomcast_server=debug")),
        )
        .init();

    // No key, no server. Refusing to start beats silently storing
    // credentials under an ephemeral key.
    let codec = SecretCodec::from_env()
        .context("ROOMCAST_SECRET_KEY must hold a base64-encoded 32-byte key")?;

    let store = ConfigStore::at_default_path(codec);
    let connector = GraphConnector::new(TransportConfig::default());
    let connection = ConnectionManager::new(store, connector);
    let registry = RoomRegistry::at_default_path();

    // Bring the connection up eagerly when credentials already exist;
    // failure is fine, the API reports it per request.
    if let Err(e) = connection.ensure_ready().await {
        info!(error = %e, "tenant connection not ready at startup");
    }

    let state = AppState::new(connection, registry);
    let app = routes::build_router(state);

    let addr = std::env::var(ADDR_ENV).unwrap_or_else(|_| DEFAULT_ADDR.to_owned());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "roomcast server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with an error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install shutdown handler");
    }
}
