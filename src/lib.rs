//! edulens - network intermediaries for the educational camera app
//!
//! Two services share this crate:
//! - a content gateway that caches and sanitizes text-generation results
//! - a reverse proxy that streams every request to one fixed upstream

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod proxy;
pub mod server;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use gateway::ContentGateway;
pub use tasks::spawn_cleanup_task;
