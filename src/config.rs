//! Configuration Module
//!
//! Handles loading the content gateway configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Hostname substrings a generated link must contain to be returned.
pub const DEFAULT_LINK_ALLOWLIST: &[&str] = &[
    "khanacademy.org",
    "youtube.com",
    "youtube-nocookie.com",
    "oercommons.org",
    "openstax.org",
    "wikimedia.org",
    "pbs.org",
    "nationalgeographic.com",
    "edutopia.org",
    "creativecommons.org",
];

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_CACHE_TTL: u64 = 3600;
const DEFAULT_MAX_ENTRIES: usize = 1000;
const DEFAULT_CLEANUP_INTERVAL: u64 = 60;
const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_PROVIDER_MODEL: &str = "gpt-4o-mini";
const DEFAULT_PROVIDER_TIMEOUT: u64 = 30;

/// Content gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// TTL in seconds for cached content, always at least 1
    pub cache_ttl: u64,
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Provider API key; requests that miss the cache fail without it
    pub api_key: Option<String>,
    /// Provider base URL, without the `/v1/...` path
    pub provider_base_url: String,
    /// Provider model name
    pub provider_model: String,
    /// Deadline for a single provider call, in seconds
    pub provider_timeout: u64,
    /// Allowed hostname substrings for returned links
    pub link_allowlist: Vec<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 4000)
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 3600)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `OPENAI_API_KEY` - Provider API key (default: unset)
    /// - `OPENAI_BASE_URL` - Provider base URL (default: https://api.openai.com)
    /// - `OPENAI_MODEL` - Provider model (default: gpt-4o-mini)
    /// - `PROVIDER_TIMEOUT_SECS` - Provider call deadline (default: 30)
    /// - `LINK_ALLOWLIST` - Comma-separated hostname substrings
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parse_var("PORT").unwrap_or(defaults.server_port),
            cache_ttl: parse_var("CACHE_TTL_SECONDS")
                .filter(|ttl| *ttl > 0)
                .unwrap_or(defaults.cache_ttl),
            max_entries: parse_var("CACHE_MAX_ENTRIES")
                .filter(|max| *max > 0)
                .unwrap_or(defaults.max_entries),
            cleanup_interval: parse_var("CLEANUP_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.cleanup_interval),
            api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            provider_base_url: env::var("OPENAI_BASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.provider_base_url),
            provider_model: env::var("OPENAI_MODEL")
                .ok()
                .filter(|model| !model.trim().is_empty())
                .unwrap_or(defaults.provider_model),
            provider_timeout: parse_var("PROVIDER_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.provider_timeout),
            link_allowlist: env::var("LINK_ALLOWLIST")
                .ok()
                .map(|raw| parse_allowlist(&raw))
                .filter(|list| !list.is_empty())
                .unwrap_or(defaults.link_allowlist),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_PORT,
            cache_ttl: DEFAULT_CACHE_TTL,
            max_entries: DEFAULT_MAX_ENTRIES,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            api_key: None,
            provider_base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            provider_model: DEFAULT_PROVIDER_MODEL.to_string(),
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            link_allowlist: DEFAULT_LINK_ALLOWLIST
                .iter()
                .map(|domain| domain.to_string())
                .collect(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Splits a comma-separated allow-list into lower-cased, non-empty entries.
pub fn parse_allowlist(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|domain| domain.trim().to_lowercase())
        .filter(|domain| !domain.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 4000);
        assert_eq!(config.cache_ttl, 3600);
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.cleanup_interval, 60);
        assert!(config.api_key.is_none());
        assert_eq!(config.provider_model, "gpt-4o-mini");
        assert!(config.link_allowlist.contains(&"khanacademy.org".to_string()));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("PORT");
        env::remove_var("CACHE_TTL_SECONDS");
        env::remove_var("CACHE_MAX_ENTRIES");
        env::remove_var("CLEANUP_INTERVAL");
        env::remove_var("LINK_ALLOWLIST");

        let config = Config::from_env();
        assert_eq!(config.server_port, 4000);
        assert_eq!(config.cache_ttl, 3600);
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.link_allowlist.len(), DEFAULT_LINK_ALLOWLIST.len());
    }

    #[test]
    fn test_parse_allowlist() {
        let list = parse_allowlist(" Khanacademy.org, ,pbs.org,");
        assert_eq!(list, vec!["khanacademy.org".to_string(), "pbs.org".to_string()]);
    }

    #[test]
    fn test_parse_allowlist_empty() {
        assert!(parse_allowlist(" , ").is_empty());
    }
}
