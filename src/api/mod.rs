//! API Module
//!
//! HTTP handlers and routing for the content gateway.
//!
//! # Endpoints
//! - `POST /api/ai` - Educational content for an object and subject
//! - `GET /api/health` - Health check endpoint
//! - `GET /api/stats` - Cache statistics

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
