//! HTTP transport abstraction

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::client::DEFAULT_TIMEOUT;
use crate::error::TransportError;
use crate::request::{Headers, Method, QueryParams};
use crate::response::ServerResponse;

/// A fully prepared attempt against one host
#[derive(Debug, Clone, Copy)]
pub struct OutboundRequest<'a> {
    pub method: Method,
    pub url: &'a Url,
    pub params: &'a QueryParams,
    pub headers: &'a Headers,
    pub body: Option<&'a [u8]>,
}

/// Performs a single HTTP round-trip
///
/// Implementations must report network-level failures as
/// [`TransportError::Connectivity`]; the failover loop only moves on to the
/// next host for those.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: OutboundRequest<'_>,
        timeout: Duration,
    ) -> Result<ServerResponse, TransportError>;

    /// Transport name for logging
    fn transport_type(&self) -> &'static str;
}

/// [`Transport`] backed by a pooled `reqwest::Client`
///
/// A transport built with [`with_timeout`](Self::with_timeout) applies the
/// timeout separately to connecting and to each read, so a host that never
/// accepts the connection surfaces as a connectivity failure. Any other
/// per-attempt timeout falls back to a whole-request deadline.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    phase_timeout: Option<Duration>,
}

impl HttpTransport {
    /// Create a transport with connect and read timeouts of [`DEFAULT_TIMEOUT`]
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a transport whose client enforces `timeout` on connect and read
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to build http client, using defaults");
                Client::new()
            });
        Self {
            client,
            phase_timeout: Some(timeout),
        }
    }

    /// Create a transport with a custom `reqwest::Client`
    ///
    /// Connect timeouts are whatever `client` was built with.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            phase_timeout: None,
        }
    }

    /// Timeout applied per connect and per read, if the client was built here
    #[must_use]
    pub fn phase_timeout(&self) -> Option<Duration> {
        self.phase_timeout
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip_all, fields(method = %request.method, url = %request.url), level = "debug")]
    async fn send(
        &self,
        request: OutboundRequest<'_>,
        timeout: Duration,
    ) -> Result<ServerResponse, TransportError> {
        let mut url = request.url.clone();
        if !request.params.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in request.params.pairs() {
                query.append_pair(key, value);
            }
        }

        let mut builder = self.client.request(to_reqwest(request.method), url);
        if self.phase_timeout != Some(timeout) {
            builder = builder.timeout(timeout);
        }
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().await?;
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let text = response.text().await?;

        debug!(status = status.as_u16(), bytes = text.len(), "response received");

        Ok(ServerResponse {
            status: status.as_u16(),
            reason,
            text,
        })
    }

    fn transport_type(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_mapping() {
        assert_eq!(to_reqwest(Method::Get), reqwest::Method::GET);
        assert_eq!(to_reqwest(Method::Post), reqwest::Method::POST);
        assert_eq!(to_reqwest(Method::Put), reqwest::Method::PUT);
        assert_eq!(to_reqwest(Method::Delete), reqwest::Method::DELETE);
    }

    #[test]
    fn default_transport_times_out_per_phase() {
        assert_eq!(HttpTransport::new().phase_timeout(), Some(DEFAULT_TIMEOUT));
        assert_eq!(
            HttpTransport::with_timeout(Duration::from_secs(2)).phase_timeout(),
            Some(Duration::from_secs(2))
        );
        assert_eq!(HttpTransport::with_client(Client::new()).phase_timeout(), None);
    }

    #[test]
    fn transport_type_is_http() {
        assert_eq!(HttpTransport::new().transport_type(), "http");
    }
}
