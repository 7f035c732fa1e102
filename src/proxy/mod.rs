//! Reverse Proxy
//!
//! Blind forwarding of every inbound request to one upstream fixed at startup.
//! Request and response bodies are streamed, never buffered whole.

pub mod forward;
pub mod target;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use forward::{forward, ProxyState, TUNNEL_BYPASS_HEADER};
pub use target::{ProxyArgs, ProxyTarget, USAGE};

/// Creates the proxy router: a single fallback route catching everything.
pub fn create_proxy_router(state: ProxyState) -> Router {
    Router::new()
        .fallback(forward)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
