//! Error types for the wukong client

use std::io;

use thiserror::Error;

/// Errors surfaced to callers of [`SolrClient`](crate::SolrClient)
///
/// Every request-path failure ends up here. Per-host connectivity and status
/// failures are recovered inside the failover loop and only show up in
/// aggregate as [`SolrError::Exhausted`].
#[derive(Error, Debug)]
pub enum SolrError {
    /// The resolved host list was empty at construction time
    #[error("SOLR reporting all nodes as down")]
    NoHosts,

    /// The coordination service could not produce a host list
    #[error("host resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// Every host was either unreachable or answered with a non-200 status
    #[error("unable to reach any server node (attempted {attempted} hosts)")]
    Exhausted {
        /// Number of hosts tried
        attempted: usize,
    },

    /// A response that is not a success reached the classifier
    #[error("{reason}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Reason phrase reported with the status
        reason: String,
    },

    /// A 200 response whose body is not a JSON object
    #[error("Parsing Error: {body}")]
    Decode {
        /// The raw, unparsable body
        body: String,
    },

    /// The transport failed for a reason other than connectivity
    #[error("transport error: {0}")]
    Transport(TransportError),

    /// A host or joined request URL is not valid
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl SolrError {
    /// Check if the error means no node produced a usable answer
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            SolrError::NoHosts | SolrError::Resolution(_) | SolrError::Exhausted { .. }
        )
    }
}

/// Errors reported by a [`Transport`](crate::Transport) for one attempt
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    /// Network-level failure (refused, reset, DNS, connect timeout)
    #[error("connection failed: {0}")]
    Connectivity(String),

    /// Any other failure after the connection was established
    #[error("request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// Check if the failover loop may move on to the next host
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(self, TransportError::Connectivity(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || is_connection_failure(&err) {
            TransportError::Connectivity(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Walk the source chain looking for a dropped or refused connection
///
/// Covers peers that accept and then reset or close before any response,
/// which reqwest does not report through `is_connect()`.
pub(crate) fn is_connection_failure(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<io::Error>() {
            if matches!(
                io.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::NotConnected
                    | io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        if e.to_string()
            .contains("connection closed before message completed")
        {
            return true;
        }
        current = e.source();
    }
    false
}

/// Errors raised while resolving the live host list
#[derive(Error, Debug, Clone)]
pub enum ResolutionError {
    /// None of the coordination endpoints answered
    #[error("coordination service unreachable: {0}")]
    Unreachable(String),

    /// The coordination service reported an empty node set
    #[error("no active nodes registered")]
    NoActiveNodes,

    /// The coordination service answered with something unexpected
    #[error("invalid coordination response: {0}")]
    InvalidResponse(String),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, SolrError>;
