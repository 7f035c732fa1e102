//! Reverse proxy server
//!
//! Forwards every request to the upstream given by `TARGET` or the first argument.

use std::net::SocketAddr;
use std::process;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use edulens::proxy::{create_proxy_router, ProxyArgs, ProxyState, TUNNEL_BYPASS_HEADER, USAGE};
use edulens::server::{init_tracing, shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ProxyArgs::parse();

    // Checked before logging is set up or any socket is bound.
    let target = match args.target() {
        Ok(target) => target,
        Err(err) => {
            eprintln!("reverse_proxy: {}", err);
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    init_tracing("edulens=info,reverse_proxy=info,tower_http=info");

    let state = ProxyState::new(target, args.upstream_timeout())
        .context("failed to build upstream client")?;
    let upstream = state.target().upstream_url("");
    let app = create_proxy_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Reverse proxy listening on http://{}", addr);
    info!("Forwarding to {}", upstream);
    info!("Injecting header: {}: 1", TUNNEL_BYPASS_HEADER);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Proxy shutdown complete");
    Ok(())
}
