//! End-to-end failover against real HTTP servers on ephemeral ports

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Json;
use serde_json::{Value, json};
use tokio::io::AsyncReadExt;

use wukong_client::{
    ClientConfig, ClusterStatusResolver, HttpTransport, QueryParams, SolrClient, SolrError,
};

/// Serve `router` on a random local port and return its `/solr/` base URL
async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/solr/")
}

/// Base URL of a port nothing listens on
fn refused_host() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/solr/")
}

/// Base URL of a node that accepts, reads the request, then resets the connection
async fn resetting_host() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            stream.set_zero_linger().unwrap();
            drop(stream);
        }
    });
    format!("http://{addr}/solr/")
}

async fn echo_select(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    Json(json!({ "params": params, "content_type": content_type }))
}

async fn echo_update(body: String) -> Json<Value> {
    Json(json!({ "received": body }))
}

fn counting(hits: &Arc<AtomicUsize>, status: StatusCode, body: &'static str) -> Router {
    let hits = Arc::clone(hits);
    Router::new().route(
        "/solr/select",
        get(move || {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (status, body)
            }
        }),
    )
}

#[tokio::test]
async fn refused_node_fails_over_to_live_node() {
    let live = spawn(Router::new().route("/solr/select", get(echo_select))).await;
    let client = SolrClient::new([refused_host(), live]).unwrap();

    let params = QueryParams::new().with("q", "*:*").with("wt", "json");
    let result = client.get("select", Some(params), None).await.unwrap();

    assert_eq!(result["params"]["q"], json!("*:*"));
    assert_eq!(result["params"]["omitHeader"], json!("true"));
    assert_eq!(result["params"]["json.nl"], json!("map"));
    assert_eq!(result["content_type"], json!("application/json"));
}

#[tokio::test]
async fn reset_connection_fails_over_to_live_node() {
    let live = spawn(Router::new().route("/solr/select", get(echo_select))).await;
    let client = SolrClient::new([resetting_host().await, live]).unwrap();

    let result = client.get("select", None, None).await.unwrap();

    assert_eq!(result["params"]["wt"], json!("json"));
}

#[tokio::test]
async fn reset_on_every_node_exhausts() {
    let client = SolrClient::new([resetting_host().await, resetting_host().await]).unwrap();

    let err = client.get("select", None, None).await.unwrap_err();

    assert!(matches!(err, SolrError::Exhausted { attempted: 2 }));
}

#[tokio::test]
async fn server_errors_exhaust_every_node_once() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let a = spawn(counting(&first, StatusCode::INTERNAL_SERVER_ERROR, "boom")).await;
    let b = spawn(counting(&second, StatusCode::NOT_FOUND, "missing")).await;
    let client = SolrClient::new([a, b]).unwrap();

    let err = client.get("select", None, None).await.unwrap_err();

    assert!(matches!(err, SolrError::Exhausted { attempted: 2 }));
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn success_is_not_followed_by_further_nodes() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let a = spawn(counting(&first, StatusCode::OK, r#"{"node":"a"}"#)).await;
    let b = spawn(counting(&second, StatusCode::OK, r#"{"node":"b"}"#)).await;
    let client = SolrClient::new([a, b]).unwrap();

    let result = client.get("select", None, None).await.unwrap();

    assert_eq!(result["node"], json!("a"));
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unparsable_body_is_reported() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let a = spawn(counting(&first, StatusCode::OK, "not json")).await;
    let b = spawn(counting(&second, StatusCode::OK, r#"{"ok":1}"#)).await;
    let client = SolrClient::new([a, b]).unwrap();

    let err = client.get("select", None, None).await.unwrap_err();

    assert_eq!(err.to_string(), "Parsing Error: not json");
    assert_eq!(second.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn post_delivers_body() {
    let live = spawn(Router::new().route("/solr/update", post(echo_update))).await;
    let client = SolrClient::new([live]).unwrap();

    let result = client
        .post("update", None, Some(br#"{"add":{"doc":{"id":"1"}}}"#.to_vec()), None)
        .await
        .unwrap();

    assert_eq!(result["received"], json!(r#"{"add":{"doc":{"id":"1"}}}"#));
}

#[tokio::test]
async fn cluster_status_discovers_live_nodes() {
    let live = spawn(Router::new().route("/solr/select", get(echo_select))).await;
    let live_node = live
        .trim_start_matches("http://")
        .trim_end_matches("/solr/")
        .to_string()
        + "_solr";

    let status = json!({ "cluster": { "collections": {}, "live_nodes": [live_node] } });
    let seed = spawn(Router::new().route(
        "/solr/admin/collections",
        get(move || {
            let status = status.clone();
            async move { Json(status) }
        }),
    ))
    .await;

    let resolver = ClusterStatusResolver::new(
        &[refused_host(), seed],
        Arc::new(HttpTransport::new()),
    )
    .unwrap();
    let client = SolrClient::builder(Vec::<String>::new())
        .coordination(Arc::new(resolver))
        .build()
        .await
        .unwrap();

    assert_eq!(client.master_hosts().len(), 1);
    assert_eq!(client.master_hosts()[0].as_str(), live);
    client.get("select", None, None).await.unwrap();
}

#[tokio::test]
async fn config_connects_through_discovery() {
    let status = json!({ "cluster": { "live_nodes": [] } });
    let seed = spawn(Router::new().route(
        "/solr/admin/collections",
        get(move || {
            let status = status.clone();
            async move { Json(status) }
        }),
    ))
    .await;

    let config = ClientConfig {
        solr_hosts: vec![refused_host()],
        discovery_hosts: Some(vec![seed]),
        timeout_secs: 5,
    };
    let err = config.connect().await.unwrap_err();

    assert!(matches!(err, SolrError::Resolution(_)));
}
