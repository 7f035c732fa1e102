//! Request forwarding
//!
//! Relays one inbound request to the fixed upstream and streams the answer back.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{
        header::{HOST, TRANSFER_ENCODING},
        HeaderName, HeaderValue,
    },
    response::{IntoResponse, Response},
};
use reqwest::{redirect, Client};
use tracing::debug;

use crate::error::ProxyError;
use crate::proxy::ProxyTarget;

/// Header injected into every forwarded request to skip tunnel interstitials.
pub const TUNNEL_BYPASS_HEADER: &str = "bypass-tunnel-reminder";

// == Proxy State ==
/// Immutable forwarding state shared by every request.
#[derive(Clone)]
pub struct ProxyState {
    target: Arc<ProxyTarget>,
    client: Client,
    upstream_timeout: Duration,
}

impl ProxyState {
    /// Builds the forwarding state. Redirects are relayed, never followed.
    pub fn new(target: ProxyTarget, upstream_timeout: Duration) -> Result<Self, ProxyError> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| ProxyError::InternalSetup(e.to_string()))?;

        Ok(Self {
            target: Arc::new(target),
            client,
            upstream_timeout,
        })
    }

    pub fn target(&self) -> &ProxyTarget {
        &self.target
    }

    // == Dispatch ==
    /// Forwards `request` upstream and converts the reply.
    ///
    /// The wait for upstream response headers is bounded by the configured
    /// timeout; body transfer in either direction is streamed and unbounded.
    /// Dropping the returned future (client gone) drops the upstream call.
    pub async fn dispatch(&self, request: Request) -> Result<Response, ProxyError> {
        let (parts, body) = request.into_parts();

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = self.target.upstream_url(path_and_query);

        let mut headers = parts.headers;
        let host = HeaderValue::from_str(&self.target.host_header())
            .map_err(|e| ProxyError::InternalSetup(e.to_string()))?;
        headers.insert(HOST, host);
        headers.insert(
            HeaderName::from_static(TUNNEL_BYPASS_HEADER),
            HeaderValue::from_static("1"),
        );

        let outbound = self
            .client
            .request(parts.method, &url)
            .headers(headers)
            .body(reqwest::Body::wrap_stream(body.into_data_stream()))
            .build()
            .map_err(|e| ProxyError::InternalSetup(e.to_string()))?;

        debug!(method = %outbound.method(), url = %url, "Forwarding request");

        let upstream = tokio::time::timeout(self.upstream_timeout, self.client.execute(outbound))
            .await
            .map_err(|_| {
                ProxyError::UpstreamUnavailable(format!(
                    "no response within {}s",
                    self.upstream_timeout.as_secs()
                ))
            })?
            .map_err(|e| ProxyError::UpstreamUnavailable(e.to_string()))?;

        Ok(relay_response(upstream))
    }
}

/// Copies status and headers (minus `transfer-encoding`) and streams the body.
fn relay_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    headers.remove(TRANSFER_ENCODING);

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Fallback handler: every method and path is forwarded.
pub async fn forward(State(state): State<ProxyState>, request: Request) -> Response {
    match state.dispatch(request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}
