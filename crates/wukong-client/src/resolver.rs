//! Host resolution
//!
//! The host list is resolved once, when the client is built. Without a
//! coordination service the caller's static list is used as-is; with one, the
//! service's live node set replaces it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::ResolutionError;
use crate::request::{Headers, Method, QueryParams};
use crate::transport::{OutboundRequest, Transport};

/// Source of the currently active node set
#[async_trait]
pub trait CoordinationService: Send + Sync {
    /// Active host base URLs, in the order the service reports them
    async fn get_active_hosts(&self) -> Result<Vec<String>, ResolutionError>;
}

/// Resolve the host list a client will use for its whole lifetime
///
/// # Errors
/// Returns [`ResolutionError`] if the coordination service fails or reports
/// no nodes. A static list is returned unchanged, even when empty; the client
/// rejects an empty list itself.
pub async fn resolve(
    static_hosts: Vec<String>,
    coordination: Option<&dyn CoordinationService>,
) -> Result<Vec<String>, ResolutionError> {
    let Some(service) = coordination else {
        return Ok(static_hosts);
    };

    debug!("fetching solr nodes from coordination service");
    let hosts = service.get_active_hosts().await?;
    if hosts.is_empty() {
        return Err(ResolutionError::NoActiveNodes);
    }
    info!(hosts = %hosts.join(","), "got solr nodes from coordination service");
    Ok(hosts)
}

/// Convert a Solr live node name (`host:port_context`) into a base URL
///
/// `10.0.0.5:8983_solr` becomes `http://10.0.0.5:8983/solr/`. The context is
/// percent-decoded; a context that does not decode to UTF-8 yields `None`.
#[must_use]
pub fn live_node_url(node_name: &str, scheme: &str) -> Option<String> {
    let (host_port, context) = node_name.split_once('_')?;
    if host_port.is_empty() || !host_port.contains(':') {
        return None;
    }
    let context = percent_decode_str(context).decode_utf8().ok()?;
    let context = context.trim_matches('/');
    if context.is_empty() {
        Some(format!("{scheme}://{host_port}/"))
    } else {
        Some(format!("{scheme}://{host_port}/{context}/"))
    }
}

/// [`CoordinationService`] reading the live node set Solr publishes
///
/// Queries the Collections API `CLUSTERSTATUS` action on each seed in order
/// and uses the first answer's `cluster.live_nodes`.
pub struct ClusterStatusResolver {
    seeds: Vec<Url>,
    transport: Arc<dyn Transport>,
    timeout: Duration,
    scheme: String,
}

impl ClusterStatusResolver {
    /// Create a resolver over the given seed base URLs
    ///
    /// # Errors
    /// Returns [`ResolutionError::Unreachable`] if a seed is not a valid URL.
    pub fn new(
        seeds: &[String],
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ResolutionError> {
        let seeds = seeds
            .iter()
            .map(|seed| {
                Url::parse(seed)
                    .map_err(|e| ResolutionError::Unreachable(format!("invalid seed {seed}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            seeds,
            transport,
            timeout: Duration::from_secs(15),
            scheme: "http".to_string(),
        })
    }

    /// Set the per-seed request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the scheme used for resolved node URLs (default `http`)
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    async fn query_seed(&self, seed: &Url) -> Result<Vec<String>, ResolutionError> {
        let url = seed
            .join("admin/collections")
            .map_err(|e| ResolutionError::Unreachable(e.to_string()))?;
        let params = QueryParams::new()
            .with("action", "CLUSTERSTATUS")
            .with("wt", "json");
        let headers = Headers::defaults();
        let request = OutboundRequest {
            method: Method::Get,
            url: &url,
            params: &params,
            headers: &headers,
            body: None,
        };

        let response = self
            .transport
            .send(request, self.timeout)
            .await
            .map_err(|e| ResolutionError::Unreachable(e.to_string()))?;
        if !response.is_ok() {
            return Err(ResolutionError::Unreachable(format!(
                "{} {}",
                response.status, response.reason
            )));
        }

        let body: Value = serde_json::from_str(&response.text)
            .map_err(|e| ResolutionError::InvalidResponse(e.to_string()))?;
        let nodes = body
            .pointer("/cluster/live_nodes")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ResolutionError::InvalidResponse("missing cluster.live_nodes".to_string())
            })?;

        let mut hosts = Vec::with_capacity(nodes.len());
        for node in nodes {
            let name = node.as_str().ok_or_else(|| {
                ResolutionError::InvalidResponse(format!("live node is not a string: {node}"))
            })?;
            match live_node_url(name, &self.scheme) {
                Some(host) => hosts.push(host),
                None => warn!(node = %name, "skipping malformed live node name"),
            }
        }
        Ok(hosts)
    }
}

#[async_trait]
impl CoordinationService for ClusterStatusResolver {
    async fn get_active_hosts(&self) -> Result<Vec<String>, ResolutionError> {
        let mut last_error = None;
        for seed in &self.seeds {
            match self.query_seed(seed).await {
                Ok(hosts) if hosts.is_empty() => return Err(ResolutionError::NoActiveNodes),
                Ok(hosts) => return Ok(hosts),
                Err(e) => {
                    info!(seed = %seed, error = %e, "coordination seed failed");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| ResolutionError::Unreachable("no seeds configured".to_string())))
    }
}
