//! Failover dispatcher over a fixed list of Solr nodes

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, Span, debug, error, info, info_span};
use url::Url;

use crate::error::{Result, SolrError};
use crate::request::{Headers, Method, QueryParams, Request};
use crate::resolver::{CoordinationService, resolve};
use crate::response::{Document, Outcome, classify};
use crate::transport::{HttpTransport, OutboundRequest, Transport};

/// Per-attempt timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for a cluster of Solr nodes
///
/// Every logical request is tried against the hosts in their stored order,
/// starting from the first host each time. Unreachable hosts and non-200
/// answers move on to the next host; the first 200 ends the loop.
pub struct SolrClient {
    master_hosts: Vec<Url>,
    transport: Arc<dyn Transport>,
    timeout: Duration,
    coordination: Option<Arc<dyn CoordinationService>>,
    span: Span,
}

impl fmt::Debug for SolrClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolrClient")
            .field("master_hosts", &self.master_hosts)
            .field("transport", &self.transport.transport_type())
            .field("timeout", &self.timeout)
            .field("coordination", &self.coordination.is_some())
            .finish_non_exhaustive()
    }
}

impl SolrClient {
    /// Create a client over a static host list with the default transport
    ///
    /// # Errors
    /// Returns [`SolrError::NoHosts`] if `solr_hosts` is empty and
    /// [`SolrError::InvalidUrl`] if a host is not a valid URL.
    ///
    /// # Example
    /// ```no_run
    /// use wukong_client::SolrClient;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = SolrClient::new(["http://solr1:8983/solr/", "http://solr2:8983/solr/"])?;
    /// let result = client.get("products/select", None, None).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new<I, S>(solr_hosts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let builder = Self::builder(solr_hosts);
        Self::from_resolved(builder.solr_hosts.clone(), builder)
    }

    /// Start building a client
    ///
    /// The static host list is only used if no coordination service is set.
    #[must_use]
    pub fn builder<I, S>(solr_hosts: I) -> SolrClientBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SolrClientBuilder {
            solr_hosts: solr_hosts.into_iter().map(Into::into).collect(),
            coordination: None,
            transport: None,
            timeout: DEFAULT_TIMEOUT,
            span: None,
        }
    }

    fn from_resolved(hosts: Vec<String>, builder: SolrClientBuilder) -> Result<Self> {
        if hosts.is_empty() {
            error!("unable to find any solr nodes to make requests to");
            return Err(SolrError::NoHosts);
        }

        let master_hosts = hosts
            .iter()
            .map(String::as_str)
            .map(Url::parse)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            master_hosts,
            transport: builder
                .transport
                .unwrap_or_else(|| Arc::new(HttpTransport::with_timeout(builder.timeout))),
            timeout: builder.timeout,
            coordination: builder.coordination,
            span: builder.span.unwrap_or_else(|| info_span!("solr_client")),
        })
    }

    /// Hosts in the order they are tried
    #[must_use]
    pub fn master_hosts(&self) -> &[Url] {
        &self.master_hosts
    }

    /// Per-attempt timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Coordination service the host list was resolved from, if any
    #[must_use]
    pub fn coordination(&self) -> Option<&Arc<dyn CoordinationService>> {
        self.coordination.as_ref()
    }

    /// Send a GET request
    ///
    /// # Errors
    /// See [`request`](Self::request).
    pub async fn get(
        &self,
        path: &str,
        params: Option<QueryParams>,
        headers: Option<Headers>,
    ) -> Result<Document> {
        self.request(Request {
            path: path.to_string(),
            method: Method::Get,
            params,
            headers,
            body: None,
        })
        .await
    }

    /// Send a POST request
    ///
    /// # Errors
    /// See [`request`](Self::request).
    ///
    /// # Example
    /// ```no_run
    /// # use wukong_client::SolrClient;
    /// # async fn example(client: SolrClient) -> Result<(), Box<dyn std::error::Error>> {
    /// let body = r#"[{"id":"1","title":"monkey king"}]"#;
    /// client.post("products/update", None, Some(body.into()), None).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn post(
        &self,
        path: &str,
        params: Option<QueryParams>,
        body: Option<Vec<u8>>,
        headers: Option<Headers>,
    ) -> Result<Document> {
        self.request(Request {
            path: path.to_string(),
            method: Method::Post,
            params,
            headers,
            body,
        })
        .await
    }

    /// Send a logical request, failing over between hosts
    ///
    /// # Errors
    /// - [`SolrError::Exhausted`] if no host answered with a 200
    /// - [`SolrError::Decode`] if the first 200 carried a body that is not a
    ///   JSON object; later hosts are not tried
    /// - [`SolrError::Transport`] for a transport failure that is not a
    ///   connectivity failure
    /// - [`SolrError::InvalidUrl`] if `path` cannot be joined onto a host
    pub async fn request(&self, request: Request) -> Result<Document> {
        self.dispatch(&request)
            .instrument(self.span.clone())
            .await
    }

    async fn dispatch(&self, request: &Request) -> Result<Document> {
        let params = request.effective_params();
        let headers = request.effective_headers();

        for host in &self.master_hosts {
            let url = host.join(&request.path)?;
            debug!(host = %host, path = %request.path, "sending request to solr");

            let outbound = OutboundRequest {
                method: request.method,
                url: &url,
                params: &params,
                headers: &headers,
                body: request.body.as_deref(),
            };

            let outcome = match self.transport.send(outbound, self.timeout).await {
                Ok(response) => {
                    debug!(
                        host = %host,
                        path = %request.path,
                        status_code = response.status,
                        "retrieved response from solr"
                    );
                    if response.is_ok() {
                        classify(&response)
                    } else {
                        Outcome::StatusFailure {
                            status: response.status,
                            reason: response.reason,
                        }
                    }
                }
                Err(e) if e.is_connectivity() => Outcome::TransportFailure(e.to_string()),
                Err(e) => return Err(SolrError::Transport(e)),
            };

            match outcome {
                Outcome::TransportFailure(message) => {
                    info!(host = %host, error = %message, "failed to connect to solr");
                }
                Outcome::StatusFailure { status, reason } => {
                    info!(
                        host = %host,
                        status_code = status,
                        reason = %reason,
                        "unsuccessful request to solr"
                    );
                }
                settled @ (Outcome::Success(_) | Outcome::DecodeFailure(_)) => {
                    return settled.into_result();
                }
            }
        }

        Err(SolrError::Exhausted {
            attempted: self.master_hosts.len(),
        })
    }
}

/// Builder for [`SolrClient`]
pub struct SolrClientBuilder {
    solr_hosts: Vec<String>,
    coordination: Option<Arc<dyn CoordinationService>>,
    transport: Option<Arc<dyn Transport>>,
    timeout: Duration,
    span: Option<Span>,
}

impl SolrClientBuilder {
    /// Resolve hosts from a coordination service instead of the static list
    #[must_use]
    pub fn coordination(mut self, service: Arc<dyn CoordinationService>) -> Self {
        self.coordination = Some(service);
        self
    }

    /// Use a custom transport
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the per-attempt timeout (default 15s)
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Record every attempt under this span
    #[must_use]
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Resolve the host list and build the client
    ///
    /// # Errors
    /// - [`SolrError::Resolution`] if the coordination service fails
    /// - [`SolrError::NoHosts`] if the resolved list is empty
    /// - [`SolrError::InvalidUrl`] if a host is not a valid URL
    pub async fn build(self) -> Result<SolrClient> {
        let hosts = resolve(self.solr_hosts.clone(), self.coordination.as_deref())
            .await
            .inspect_err(|e| error!(error = %e, "failed to resolve solr nodes"))?;
        SolrClient::from_resolved(hosts, self)
    }
}
