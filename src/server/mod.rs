//! HTTP 绑定：基于 axum 暴露发现、调用与动作端点。
//!
//! # HTTP Binding
//!
//! | Route | Body | Answer |
//! |-------|------|--------|
//! | `GET /` | - | `{status:"healthy", service}` |
//! | `GET /health` | - | `{status, tools_available, timestamp}` |
//! | `GET /tools` | - | `{tools:[ToolSchema]}` |
//! | `POST /invoke` | Request | Response envelope |
//! | `POST /mcp` | `{action, data?}` | `{tools}` or Response envelope |
//!
//! Envelopes are always answered with HTTP 200, whatever their status. Bodies that
//! cannot be read as a request are answered with 400 and `{detail}`.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response as HttpResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::dispatcher::Dispatcher;
use crate::types::ToolRequest;
use crate::Result;

pub const SERVICE_NAME: &str = "mcp-gateway";

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
}

/// Rejection answered as 400 `{detail}`.
#[derive(Debug)]
struct BadRequest(String);

impl IntoResponse for BadRequest {
    fn into_response(self) -> HttpResponse {
        debug!(detail = %self.0, "rejected request body");
        (StatusCode::BAD_REQUEST, Json(json!({ "detail": self.0 }))).into_response()
    }
}

/// Build the router around a shared dispatcher.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/tools", get(tools))
        .route("/invoke", post(invoke))
        .route("/mcp", post(mcp))
        .with_state(AppState { dispatcher })
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    shutdown: F,
) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, tools = dispatcher.registry().len(), "gateway listening");
    }
    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("gateway stopped");
    Ok(())
}

/// Bind `addr` and serve until ctrl-c.
pub async fn serve(addr: SocketAddr, dispatcher: Arc<Dispatcher>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_with_shutdown(listener, dispatcher, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn root() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": SERVICE_NAME }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    Json(json!({
        "status": "healthy",
        "tools_available": state.dispatcher.registry().len(),
        "timestamp": timestamp,
    }))
}

async fn tools(State(state): State<AppState>) -> Json<Value> {
    let tools = state.dispatcher.list_tools().await;
    Json(json!({ "tools": tools }))
}

async fn invoke(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<Json<crate::types::Response>, BadRequest> {
    let request: ToolRequest = serde_json::from_slice(&body)
        .map_err(|e| BadRequest(format!("Invalid request body: {}", e)))?;
    Ok(Json(state.dispatcher.handle(&request).await))
}

async fn mcp(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<HttpResponse, BadRequest> {
    let mut envelope: Value = serde_json::from_slice(&body)
        .map_err(|e| BadRequest(format!("Invalid request body: {}", e)))?;

    let action = envelope
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| BadRequest("Missing 'action' field".to_string()))?
        .to_string();

    match action.as_str() {
        "list_tools" => {
            let tools = state.dispatcher.list_tools().await;
            Ok(Json(json!({ "tools": tools })).into_response())
        }
        "invoke_tool" => {
            let data = match envelope.get_mut("data").map(Value::take) {
                Some(Value::Null) | None => {
                    return Err(BadRequest("Missing tool invocation data".to_string()))
                }
                Some(data) => data,
            };
            let request: ToolRequest = serde_json::from_value(data)
                .map_err(|e| BadRequest(format!("Invalid tool invocation data: {}", e)))?;
            Ok(Json(state.dispatcher.handle(&request).await).into_response())
        }
        other => Err(BadRequest(format!("Unknown action: {}", other))),
    }
}
