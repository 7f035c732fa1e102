//! Content Gateway
//!
//! Turns `(objectName, subject)` requests into sanitized, cached content.
//!
//! # Flow
//! 1. Validate and fingerprint the request
//! 2. Serve from the cache on a hit
//! 3. On a miss, call the generation provider (one call per fingerprint at a time)
//! 4. Parse and schema-check the output; unusable output gets the fallback
//! 5. Sanitize links and related objects, then write through to the cache

pub mod parse;
pub mod provider;
pub mod sanitize;
pub mod singleflight;

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{fingerprint, CacheStore};
use crate::error::{GatewayError, Result};
use crate::models::{ContentRequest, ContentResponse, ValidContentRequest};

pub use parse::{parse_generated, GeneratedContent, ParseFailure};
pub use provider::{GenerationProvider, OpenAiProvider, Prompt};
pub use sanitize::{normalize_related_objects, LinkAllowlist, MAX_RELATED_OBJECTS};
pub use singleflight::SingleFlight;

// == Content Gateway ==
/// Request handler core, cheap to clone and shared across tasks.
#[derive(Clone)]
pub struct ContentGateway {
    cache: Arc<RwLock<CacheStore>>,
    provider: Arc<dyn GenerationProvider>,
    allowlist: Arc<LinkAllowlist>,
    flights: Arc<SingleFlight<Result<ContentResponse>>>,
    cache_ttl: u64,
}

impl ContentGateway {
    pub fn new(
        cache: Arc<RwLock<CacheStore>>,
        provider: Arc<dyn GenerationProvider>,
        allowlist: LinkAllowlist,
        cache_ttl: u64,
    ) -> Self {
        Self {
            cache,
            provider,
            allowlist: Arc::new(allowlist),
            flights: Arc::new(SingleFlight::new()),
            cache_ttl: cache_ttl.max(1),
        }
    }

    /// Shared handle to the content cache.
    pub fn cache(&self) -> &Arc<RwLock<CacheStore>> {
        &self.cache
    }

    pub fn allowlist(&self) -> &LinkAllowlist {
        &self.allowlist
    }

    // == Handle ==
    /// Produces content for a request.
    ///
    /// # Errors
    /// - `Validation` when either field is missing or blank
    /// - `Upstream`, `Transport`, `MissingApiKey`, `Internal` from the provider call
    ///
    /// Unusable provider output is not an error; it yields the fallback content.
    pub async fn handle(&self, request: &ContentRequest) -> Result<ContentResponse> {
        let request = request.validate().map_err(GatewayError::Validation)?;
        let key = fingerprint(&request.object_name, &request.subject);

        if let Some(hit) = self.cache.write().await.get(&key) {
            debug!(key = %key, "Cache hit");
            return Ok(hit);
        }
        debug!(key = %key, "Cache miss");

        let gateway = self.clone();
        let flight_key = key.clone();
        self.flights
            .run(&key, move || async move {
                gateway.generate(flight_key, request).await
            })
            .await
    }

    async fn generate(&self, key: String, request: ValidContentRequest) -> Result<ContentResponse> {
        // A flight that finished between our lookup and this call may have
        // filled the cache already.
        if let Some(hit) = self.cache.read().await.peek(&key) {
            return Ok(hit);
        }

        let prompt = Prompt::for_request(&request.object_name, &request.subject);
        let raw = self.provider.generate(&prompt).await?;

        match parse_generated(&raw) {
            Ok(content) => {
                let response = sanitize::shape_response(content, &self.allowlist);
                self.cache
                    .write()
                    .await
                    .set(key.clone(), response.clone(), self.cache_ttl);
                info!(key = %key, links = response.links.len(), "Cached generated content");
                Ok(response)
            }
            Err(reason) => {
                warn!(key = %key, %reason, "Unusable provider output, serving fallback");
                Ok(ContentResponse::fallback(
                    &request.object_name,
                    &request.subject,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_LINK_ALLOWLIST;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    /// Scripted provider that counts its invocations.
    struct ScriptedProvider {
        reply: Mutex<Result<String>>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn replying(reply: Result<String>) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(reply),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn slow(reply: Result<String>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(reply),
                delay,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationProvider for ScriptedProvider {
        async fn generate(&self, _prompt: &Prompt) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.reply.lock().unwrap().clone()
        }
    }

    const TREE_JSON: &str = r#"{
        "title": "Trees",
        "text": "Trees are tall plants.",
        "explanation": "They use sunlight to make food.",
        "funFacts": ["Some trees live for thousands of years", "Leaves change color"],
        "links": [
            {"title": "Trees on Khan", "url": "https://www.khanacademy.org/trees", "source": "Khan Academy"},
            {"title": "Shady", "url": "https://malware.example.com/trees"}
        ],
        "relatedObjects": [" leaf ", "", "root", "seed", "bark"]
    }"#;

    fn gateway(provider: Arc<ScriptedProvider>) -> ContentGateway {
        ContentGateway::new(
            Arc::new(RwLock::new(CacheStore::new(100))),
            provider,
            LinkAllowlist::new(DEFAULT_LINK_ALLOWLIST),
            3600,
        )
    }

    #[tokio::test]
    async fn test_rejects_missing_fields() {
        let provider = ScriptedProvider::replying(Ok(TREE_JSON.to_string()));
        let gateway = gateway(provider.clone());

        let result = gateway.handle(&ContentRequest::new("tree", " ")).await;

        assert!(matches!(result, Err(GatewayError::Validation(_))));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_sanitizes_and_caches_generated_content() {
        let provider = ScriptedProvider::replying(Ok(TREE_JSON.to_string()));
        let gateway = gateway(provider.clone());

        let response = assert_ok!(gateway.handle(&ContentRequest::new("tree", "biologia")).await);

        assert_eq!(response.title, "Trees");
        assert_eq!(response.links.len(), 1);
        assert!(response.links[0].url.contains("khanacademy.org"));
        assert_eq!(response.related_objects, vec!["leaf", "root", "seed"]);
        assert_eq!(gateway.cache().read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_identical_requests_hit_cache() {
        let provider = ScriptedProvider::replying(Ok(TREE_JSON.to_string()));
        let gateway = gateway(provider.clone());

        let first = gateway
            .handle(&ContentRequest::new("Tree", " Biologia "))
            .await
            .unwrap();
        let second = gateway
            .handle(&ContentRequest::new("tree", "biologia"))
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_parse_failure_serves_fallback_without_caching() {
        let provider = ScriptedProvider::replying(Ok("Sorry, I can't do that.".to_string()));
        let gateway = gateway(provider.clone());

        let response = gateway
            .handle(&ContentRequest::new("rock", "geology"))
            .await
            .unwrap();

        assert_eq!(response, ContentResponse::fallback("rock", "geology"));
        assert!(gateway.cache().read().await.is_empty());

        gateway
            .handle(&ContentRequest::new("rock", "geology"))
            .await
            .unwrap();
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_array_reply_serves_fallback_without_caching() {
        let provider =
            ScriptedProvider::replying(Ok(r#"["Sure", "I can't help with that"]"#.to_string()));
        let gateway = gateway(provider.clone());
        let request = ContentRequest::new("tree", "art");

        let response = assert_ok!(gateway.handle(&request).await);

        assert_eq!(response, ContentResponse::fallback("tree", "art"));
        assert!(gateway.cache().read().await.is_empty());

        assert_ok!(gateway.handle(&request).await);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_disconnected_caller_leaves_no_flight_behind() {
        let provider = ScriptedProvider::slow(Ok(TREE_JSON.to_string()), Duration::from_secs(5));
        let gateway = gateway(provider.clone());

        let task = {
            let gateway = gateway.clone();
            tokio::spawn(async move { gateway.handle(&ContentRequest::new("tree", "art")).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(gateway.flights.len(), 1);

        task.abort();
        let _ = task.await;

        assert!(gateway.flights.is_empty());
        assert!(gateway.cache().read().await.is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_is_not_cached() {
        let provider = ScriptedProvider::replying(Err(GatewayError::Upstream {
            status: 429,
            body: "slow down".to_string(),
        }));
        let gateway = gateway(provider.clone());

        let result = gateway.handle(&ContentRequest::new("tree", "art")).await;
        let err = assert_err!(result);

        assert_eq!(
            err,
            GatewayError::Upstream {
                status: 429,
                body: "slow down".to_string()
            }
        );
        assert!(gateway.cache().read().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_provider_call() {
        let provider =
            ScriptedProvider::slow(Ok(TREE_JSON.to_string()), Duration::from_millis(100));
        let gateway = gateway(provider.clone());

        let request = ContentRequest::new("tree", "biologia");
        let (a, b, c) = tokio::join!(
            gateway.handle(&request),
            gateway.handle(&request),
            gateway.handle(&request),
        );

        assert_eq!(a.unwrap(), b.clone().unwrap());
        assert_eq!(b.unwrap(), c.unwrap());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_new_generation() {
        let provider = ScriptedProvider::replying(Ok(TREE_JSON.to_string()));
        let gateway = ContentGateway::new(
            Arc::new(RwLock::new(CacheStore::new(100))),
            provider.clone(),
            LinkAllowlist::new(DEFAULT_LINK_ALLOWLIST),
            1,
        );
        let request = ContentRequest::new("tree", "biologia");

        gateway.handle(&request).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        gateway.handle(&request).await.unwrap();

        assert_eq!(provider.calls(), 2);
    }
}
