//! API Handlers
//!
//! HTTP request handlers for each content gateway endpoint.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use tokio::sync::RwLock;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::gateway::{ContentGateway, GenerationProvider, LinkAllowlist, OpenAiProvider};
use crate::models::{ContentRequest, ContentResponse, HealthResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: ContentGateway,
}

impl AppState {
    /// Creates a new AppState around an existing gateway.
    pub fn new(gateway: ContentGateway) -> Self {
        Self { gateway }
    }

    /// Wires a gateway from its parts.
    pub fn with_provider(
        cache: CacheStore,
        provider: Arc<dyn GenerationProvider>,
        allowlist: LinkAllowlist,
        cache_ttl: u64,
    ) -> Self {
        Self::new(ContentGateway::new(
            Arc::new(RwLock::new(cache)),
            provider,
            allowlist,
            cache_ttl,
        ))
    }

    /// Creates a new AppState from configuration, talking to the configured
    /// OpenAI-compatible provider.
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = OpenAiProvider::from_config(config)?;

        Ok(Self::with_provider(
            CacheStore::new(config.max_entries),
            Arc::new(provider),
            LinkAllowlist::new(&config.link_allowlist),
            config.cache_ttl,
        ))
    }

    /// Shared handle to the content cache.
    pub fn cache(&self) -> Arc<RwLock<CacheStore>> {
        self.gateway.cache().clone()
    }
}

/// Handler for POST /api/ai
///
/// The body is parsed by hand so that malformed JSON is reported as a
/// validation failure (400) rather than an extractor rejection.
pub async fn content_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ContentResponse>> {
    let request: ContentRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ContentRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|_| GatewayError::Validation("Invalid JSON request body".to_string()))?
    };

    let response = state.gateway.handle(&request).await?;
    Ok(Json(response))
}

/// Handler for GET /api/health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /api/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.gateway.cache().read().await.stats();
    Json(stats.into())
}
