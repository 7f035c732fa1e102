//! Response sanitization
//!
//! Filters generated links against the allow-list and bounds related objects.

use serde_json::Value;
use url::Url;

use crate::gateway::parse::GeneratedContent;
use crate::models::{ContentResponse, LinkRef};

/// Maximum number of related objects returned to clients.
pub const MAX_RELATED_OBJECTS: usize = 3;

// == Link Allow-list ==
/// Hostname substrings a link must contain to reach a client.
#[derive(Debug, Clone)]
pub struct LinkAllowlist {
    domains: Vec<String>,
}

impl LinkAllowlist {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|domain| domain.as_ref().trim().to_lowercase())
                .filter(|domain| !domain.is_empty())
                .collect(),
        }
    }

    /// True when the (lower-cased) hostname contains an allowed substring.
    pub fn permits(&self, hostname: &str) -> bool {
        let hostname = hostname.to_lowercase();
        self.domains.iter().any(|domain| hostname.contains(domain.as_str()))
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    // == Sanitize Links ==
    /// Keeps the links whose URL is absolute http(s) and whose host is allowed.
    ///
    /// Anything that is not an array yields no links. Entries that are not
    /// objects, lack a usable URL, or point elsewhere are dropped silently.
    pub fn sanitize_links(&self, raw: &Value) -> Vec<LinkRef> {
        let Some(candidates) = raw.as_array() else {
            return Vec::new();
        };

        candidates
            .iter()
            .filter_map(|candidate| self.sanitize_link(candidate))
            .collect()
    }

    fn sanitize_link(&self, candidate: &Value) -> Option<LinkRef> {
        let url = Url::parse(candidate.get("url")?.as_str()?.trim()).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        let hostname = url.host_str()?;
        if !self.permits(hostname) {
            return None;
        }

        let title = non_empty_str(candidate.get("title")).unwrap_or(hostname);
        let source = non_empty_str(candidate.get("source")).unwrap_or("");

        Some(LinkRef {
            title: title.to_string(),
            url: url.as_str().to_string(),
            source: source.to_string(),
        })
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

// == Related Objects ==
/// Returns at most three trimmed, non-empty related object names.
///
/// Numbers and booleans are kept in their JSON spelling; nulls, arrays and
/// objects are dropped.
pub fn normalize_related_objects(raw: &Value) -> Vec<String> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .filter(|name| !name.is_empty())
        .take(MAX_RELATED_OBJECTS)
        .collect()
}

/// Converts schema-checked provider output into the client response.
pub fn shape_response(content: GeneratedContent, allowlist: &LinkAllowlist) -> ContentResponse {
    ContentResponse {
        links: allowlist.sanitize_links(&content.links),
        related_objects: normalize_related_objects(&content.related_objects),
        title: content.title,
        text: content.text,
        explanation: content.explanation,
        fun_facts: content.fun_facts,
    }
}
