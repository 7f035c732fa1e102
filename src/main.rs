//! Content gateway server
//!
//! Serves `POST /api/ai` backed by the generation provider and the content cache.

use std::net::SocketAddr;

use anyhow::Context;
use tracing::{info, warn};

use edulens::api::{create_router, AppState};
use edulens::server::{init_tracing, shutdown_signal};
use edulens::{spawn_cleanup_task, Config};

/// Main entry point for the content gateway.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the gateway state (cache, provider client, allow-list)
/// 4. Start background TTL sweep task
/// 5. Serve until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("edulens=info,content_gateway=info,tower_http=info");

    info!("Starting content gateway");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, cache_ttl={}s, max_entries={}, cleanup_interval={}s, model={}",
        config.server_port,
        config.cache_ttl,
        config.max_entries,
        config.cleanup_interval,
        config.provider_model
    );
    if config.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; uncached requests will fail");
    }

    let state = AppState::from_config(&config).context("failed to build gateway state")?;
    info!(
        "Link allow-list: {}",
        state.gateway.allowlist().domains().join(", ")
    );

    let cleanup_handle = spawn_cleanup_task(state.cache(), config.cleanup_interval);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Content gateway listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    cleanup_handle.abort();
    info!("Server shutdown complete");
    Ok(())
}
