//! Client configuration

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::SolrClient;
use crate::error::Result;
use crate::resolver::ClusterStatusResolver;
use crate::transport::{HttpTransport, Transport};

/// Settings needed to build a [`SolrClient`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Static Solr base URLs, tried in order
    #[serde(default)]
    pub solr_hosts: Vec<String>,
    /// Seed endpoints used to discover live nodes instead of `solr_hosts`
    #[serde(default)]
    pub discovery_hosts: Option<Vec<String>>,
    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            solr_hosts: Vec::new(),
            discovery_hosts: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build a client, discovering live nodes if `discovery_hosts` is set
    ///
    /// # Errors
    /// Returns an error if discovery fails or no usable host remains.
    pub async fn connect(&self) -> Result<SolrClient> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::with_timeout(self.timeout()));
        let mut builder = SolrClient::builder(self.solr_hosts.clone())
            .transport(Arc::clone(&transport))
            .timeout(self.timeout());

        if let Some(seeds) = &self.discovery_hosts {
            let resolver = ClusterStatusResolver::new(seeds, transport)?.with_timeout(self.timeout());
            builder = builder.coordination(Arc::new(resolver));
        }

        builder.build().await
    }
}
