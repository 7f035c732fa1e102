//! Response DTOs for the content gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::{Deserialize, Serialize};

/// A vetted link to an external learning resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    /// Display title (defaults to the link's hostname)
    pub title: String,
    /// Absolute, normalized URL
    pub url: String,
    /// Free-form source label, possibly empty
    pub source: String,
}

/// Educational content returned by POST /api/ai.
///
/// This is also the payload held by the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    pub title: String,
    pub text: String,
    pub explanation: String,
    pub fun_facts: Vec<String>,
    pub links: Vec<LinkRef>,
    pub related_objects: Vec<String>,
}

impl ContentResponse {
    // == Fallback ==
    /// Builds the templated response served when provider output is unusable.
    ///
    /// Depends only on its inputs, so identical requests always receive
    /// identical fallbacks.
    pub fn fallback(object_name: &str, subject: &str) -> Self {
        Self {
            title: format!("{}: Getting to know {}", subject, object_name),
            text: format!(
                "Let's discover what {} is and why it's interesting from the {} perspective.",
                object_name, subject
            ),
            explanation: format!(
                "Observe {} and ask: what is it, how does it work and why does it matter?",
                object_name
            ),
            fun_facts: vec![
                "Ask curious questions and try simple experiments or drawings.".to_string(),
            ],
            links: Vec::new(),
            related_objects: Vec::new(),
        }
    }
}

/// Response body for the health endpoint (GET /api/health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always true while the server is answering
    pub ok: bool,
    /// Current time as Unix epoch milliseconds
    pub time: i64,
}

impl HealthResponse {
    /// Creates a new HealthResponse with the current time
    pub fn healthy() -> Self {
        Self {
            ok: true,
            time: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Response body for the stats endpoint (GET /api/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

/// Error response body for client and server errors
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Error body for a failed provider call; status and body are relayed
/// for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamErrorResponse {
    pub error: String,
    pub status: u16,
    pub body: String,
}
