//! Proxy target and command-line configuration

use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::error::ConfigError;

/// Printed when the proxy is started without a target.
pub const USAGE: &str = "Usage: TARGET=https://your-tunnel.loca.lt reverse_proxy\n   or: reverse_proxy https://your-tunnel.loca.lt";

// == Proxy Target ==
/// The single upstream every request is forwarded to.
///
/// Parsed once at startup and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    /// `http` or `https`
    pub scheme: String,
    /// Hostname as used in URLs
    pub host: String,
    /// Explicit port, or the scheme default
    pub port: u16,
    /// Path prefix without trailing slash; empty for the root
    pub base_path: String,
}

impl ProxyTarget {
    /// Parses an absolute http(s) URL. One trailing slash is ignored.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        let invalid = |reason: &str| ConfigError::InvalidTarget(raw.to_string(), reason.to_string());

        let url = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| invalid("missing port"))?;
        let base_path = match url.path() {
            "/" => String::new(),
            path => path.trim_end_matches('/').to_string(),
        };

        Ok(Self {
            scheme: url.scheme().to_string(),
            host: host.to_string(),
            port,
            base_path,
        })
    }

    /// Value for the outbound `Host` header; the port is omitted when it is
    /// the scheme default.
    pub fn host_header(&self) -> String {
        let default_port = match self.scheme.as_str() {
            "https" => 443,
            _ => 80,
        };
        if self.port == default_port {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Absolute upstream URL for an inbound path-and-query.
    pub fn upstream_url(&self, path_and_query: &str) -> String {
        let mut path = format!("{}{}", self.base_path, path_and_query);
        if path.is_empty() {
            path.push('/');
        }
        format!("{}://{}:{}{}", self.scheme, self.host, self.port, path)
    }
}

// == Command Line ==
/// Reverse proxy command line. Every option can also come from the environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "reverse_proxy", about = "Forward every request to one fixed upstream")]
pub struct ProxyArgs {
    /// Upstream base URL, e.g. https://your-tunnel.loca.lt
    #[arg(env = "TARGET")]
    pub target: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Seconds to wait for upstream response headers
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 30)]
    pub upstream_timeout_secs: u64,
}

impl ProxyArgs {
    /// The parsed target, or a configuration error when it is absent or invalid.
    pub fn target(&self) -> Result<ProxyTarget, ConfigError> {
        let raw = self
            .target
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingTarget)?;
        ProxyTarget::parse(raw)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs.max(1))
    }
}
