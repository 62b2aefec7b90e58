//! End-to-end checks against the axum binding on an ephemeral port.

#![cfg(feature = "server")]

use mcp_gateway::compare::{ComparisonEngine, CompareOptions, HttpEndpoint, LocalEndpoint};
use mcp_gateway::{server, tools, Dispatcher};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_test::assert_ok;

struct TestGateway {
    base_url: String,
    dispatcher: Arc<Dispatcher>,
    shutdown: Option<oneshot::Sender<()>>,
    join: tokio::task::JoinHandle<mcp_gateway::Result<()>>,
}

impl TestGateway {
    async fn start() -> Self {
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(tools::default_registry().unwrap())));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let join = tokio::spawn(server::serve_with_shutdown(
            listener,
            dispatcher.clone(),
            async move {
                let _ = rx.await;
            },
        ));
        Self {
            base_url: format!("http://{}", addr),
            dispatcher,
            shutdown: Some(tx),
            join,
        }
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        assert_ok!(self.join.await.unwrap());
    }
}

#[tokio::test]
async fn test_health_routes() {
    let gw = TestGateway::start().await;
    let client = reqwest::Client::new();

    let root: Value = client
        .get(&gw.base_url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(root["status"], "healthy");

    let health: Value = client
        .get(format!("{}/health", gw.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["tools_available"], 3);
    assert!(health["timestamp"].as_f64().unwrap() > 0.0);

    drop(client);
    gw.stop().await;
}

#[tokio::test]
async fn test_tools_route_lists_in_registration_order() {
    let gw = TestGateway::start().await;
    let body: Value = reqwest::get(format!("{}/tools", gw.base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<_> = body["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["search", "database", "file_ops"]);
    assert_eq!(body["tools"][0]["parameters"]["query"]["type"], "string");
    gw.stop().await;
}

#[tokio::test]
async fn test_invoke_route_answers_envelopes_with_200() {
    let gw = TestGateway::start().await;
    let client = reqwest::Client::new();
    let url = format!("{}/invoke", gw.base_url);

    let ok = client
        .post(&url)
        .json(&json!({"tool": "search", "request_id": "r2", "parameters": {"query": "cats"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), 200);
    let ok: Value = ok.json().await.unwrap();
    assert_eq!(ok["status"], "success");
    assert_eq!(ok["request_id"], "r2");
    assert_eq!(ok["data"]["query"], "cats");

    let missing = client
        .post(&url)
        .json(&json!({"tool": "search", "request_id": "r1", "parameters": {}}))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 200);
    let missing: Value = missing.json().await.unwrap();
    assert_eq!(missing["status"], "error");
    assert_eq!(missing["error"]["code"], "MISSING_PARAMETER");

    let garbage = client
        .post(&url)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(garbage.status(), 400);
    let detail: Value = garbage.json().await.unwrap();
    assert!(detail["detail"].is_string());

    drop(client);
    gw.stop().await;
}

#[tokio::test]
async fn test_mcp_route_actions() {
    let gw = TestGateway::start().await;
    let client = reqwest::Client::new();
    let url = format!("{}/mcp", gw.base_url);

    let listed: Value = client
        .post(&url)
        .json(&json!({"action": "list_tools"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed["tools"].as_array().unwrap().len(), 3);

    let invoked: Value = client
        .post(&url)
        .json(&json!({
            "action": "invoke_tool",
            "data": {"tool": "file_ops", "request_id": "f1", "parameters": {"operation": "list", "path": "/tmp"}}
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(invoked["status"], "success");
    assert_eq!(invoked["data"]["count"], 3);

    let no_data = client
        .post(&url)
        .json(&json!({"action": "invoke_tool"}))
        .send()
        .await
        .unwrap();
    assert_eq!(no_data.status(), 400);
    let body: Value = no_data.json().await.unwrap();
    assert_eq!(body["detail"], "Missing tool invocation data");

    let unknown = client
        .post(&url)
        .json(&json!({"action": "reboot"}))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), 400);
    let body: Value = unknown.json().await.unwrap();
    assert_eq!(body["detail"], "Unknown action: reboot");

    drop(client);
    gw.stop().await;
}

#[tokio::test]
async fn test_compare_http_against_local() {
    let gw = TestGateway::start().await;

    let remote = HttpEndpoint::new("http", &gw.base_url).unwrap();
    let local = LocalEndpoint::new("local", gw.dispatcher.clone());
    let engine = ComparisonEngine::new(CompareOptions {
        requests: 12,
        concurrency: 3,
        ..CompareOptions::default()
    })
    .unwrap();
    let report = engine.compare(&remote, &local).await;

    assert_eq!(report.endpoint_a.success_rate, 100.0);
    assert_eq!(report.endpoint_b.success_rate, 100.0);
    assert_eq!(report.samples.len(), 24);

    drop(remote);
    gw.stop().await;
}
