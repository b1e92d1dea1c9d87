#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use wukong_client::{
    Headers, Method, OutboundRequest, QueryParams, ServerResponse, SolrClient, Transport,
    TransportError,
};

/// What a scripted host does when contacted
#[derive(Debug, Clone)]
pub enum Script {
    Refuse,
    ConnectTimeout,
    Respond(u16, &'static str, &'static str),
    ReadTimeout,
}

/// One recorded attempt
#[derive(Debug, Clone)]
pub struct Call {
    pub host: String,
    pub url: String,
    pub method: Method,
    pub params: QueryParams,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
}

/// Transport answering from a per-host script and recording every attempt
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new(scripts: &[(&str, Script)]) -> Arc<Self> {
        Arc::new(Self {
            scripts: scripts
                .iter()
                .map(|(host, script)| ((*host).to_string(), script.clone()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn attempted_hosts(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.host).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: OutboundRequest<'_>,
        timeout: Duration,
    ) -> Result<ServerResponse, TransportError> {
        let host = request.url.host_str().unwrap_or_default().to_string();
        self.calls.lock().unwrap().push(Call {
            host: host.clone(),
            url: request.url.to_string(),
            method: request.method,
            params: request.params.clone(),
            headers: request.headers.clone(),
            body: request.body.map(<[u8]>::to_vec),
            timeout,
        });

        match self.scripts.get(&host).cloned().unwrap_or(Script::Refuse) {
            Script::Refuse => Err(TransportError::Connectivity(format!(
                "connection refused: {host}"
            ))),
            Script::ConnectTimeout => Err(TransportError::Connectivity(format!(
                "operation timed out while connecting to {host}"
            ))),
            Script::Respond(status, reason, body) => Ok(ServerResponse::new(status, reason, body)),
            Script::ReadTimeout => Err(TransportError::Request("operation timed out".to_string())),
        }
    }

    fn transport_type(&self) -> &'static str {
        "scripted"
    }
}

/// Client over `hosts` using the scripted transport
pub async fn client(hosts: &[&str], transport: &Arc<ScriptedTransport>) -> SolrClient {
    let transport: Arc<dyn Transport> = transport.clone();
    SolrClient::builder(hosts.iter().copied())
        .transport(transport)
        .build()
        .await
        .unwrap()
}
