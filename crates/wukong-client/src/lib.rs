//! wukong-client: failover HTTP client for Solr clusters
//!
//! Sends each request to the configured nodes one after another until a node
//! answers with a 200, and reports every failure through [`SolrError`].
//!
//! # Examples
//!
//! ## Static host list
//!
//! ```no_run
//! use wukong_client::{QueryParams, SolrClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SolrClient::new(["http://solr1:8983/solr/", "http://solr2:8983/solr/"])?;
//!
//! let params = QueryParams::new().with("q", "title:monkey").with("rows", "10");
//! let result = client.get("products/select", Some(params), None).await?;
//! println!("{}", result["response"]["numFound"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Live node discovery
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use wukong_client::{ClusterStatusResolver, HttpTransport, SolrClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(HttpTransport::new());
//! let resolver = ClusterStatusResolver::new(&["http://seed:8983/solr/".to_string()], transport)?;
//! let client = SolrClient::builder(Vec::<String>::new())
//!     .coordination(Arc::new(resolver))
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod resolver;
pub mod response;
pub mod transport;

pub use client::{DEFAULT_TIMEOUT, SolrClient, SolrClientBuilder};
pub use config::ClientConfig;
pub use error::{ResolutionError, Result, SolrError, TransportError};
pub use request::{Headers, Method, QueryParams, Request};
pub use resolver::{ClusterStatusResolver, CoordinationService, live_node_url, resolve};
pub use response::{Document, Outcome, ServerResponse, classify, process_response};
pub use transport::{HttpTransport, OutboundRequest, Transport};
