use reqwest::StatusCode;
use serde_json::Value;
use std::env;
use std::time::Duration;
use url::Url;

use super::TransportError;
use crate::types::{GatewayCall, Response, ToolSchema};

/// Parsed body of a `/mcp` reply.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayReply {
    /// Answer to `list_tools`
    Tools(Vec<ToolSchema>),
    /// Answer to `invoke_tool`
    Envelope(Response),
}

/// reqwest client bound to one gateway base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport for `base_url`. A trailing slash is trimmed; the URL must be
    /// absolute `http` or `https`.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let base_url = normalize_base_url(base_url)?;

        let pool_max_idle = env::var("MCP_GATEWAY_HTTP_POOL_MAX_IDLE_PER_HOST")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(32);

        // Per-request deadlines are enforced by the caller, not by the client.
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(pool_max_idle)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `call` to `{base}/mcp` and parse the reply.
    pub async fn call(&self, call: &GatewayCall) -> Result<GatewayReply, TransportError> {
        let url = format!("{}/mcp", self.base_url);
        let response = self.client.post(&url).json(call).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        parse_reply(call, body)
    }
}

fn normalize_base_url(raw: &str) -> Result<String, TransportError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|e| TransportError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(TransportError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

fn parse_reply(call: &GatewayCall, body: Value) -> Result<GatewayReply, TransportError> {
    match call {
        GatewayCall::ListTools => {
            let tools = body
                .get("tools")
                .cloned()
                .ok_or_else(|| TransportError::Other("reply has no 'tools' field".into()))?;
            let tools: Vec<ToolSchema> = serde_json::from_value(tools)
                .map_err(|e| TransportError::Other(format!("malformed tool list: {}", e)))?;
            Ok(GatewayReply::Tools(tools))
        }
        GatewayCall::InvokeTool { .. } => {
            let envelope: Response = serde_json::from_value(body)
                .map_err(|e| TransportError::Other(format!("malformed envelope: {}", e)))?;
            Ok(GatewayReply::Envelope(envelope))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolRequest;
    use serde_json::json;

    #[test]
    fn test_base_url_normalization() {
        assert_eq!(
            normalize_base_url("http://localhost:8080/").unwrap(),
            "http://localhost:8080"
        );
        assert_eq!(
            normalize_base_url(" https://gw.example.com/prod ").unwrap(),
            "https://gw.example.com/prod"
        );
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(TransportError::InvalidUrl { .. })
        ));
        assert!(matches!(
            normalize_base_url("ftp://host"),
            Err(TransportError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_parse_envelope_reply() {
        let call = GatewayCall::invoke(ToolRequest::new("search", "r1"));
        let body = json!({
            "status": "error",
            "request_id": "r1",
            "error": {"code": "MISSING_PARAMETER", "message": "Missing required parameter: query"},
            "execution_time_ms": 0.1
        });
        match parse_reply(&call, body).unwrap() {
            GatewayReply::Envelope(resp) => assert!(!resp.is_success()),
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_parse_tools_reply_requires_tools_field() {
        let err = parse_reply(&GatewayCall::ListTools, json!({"items": []})).unwrap_err();
        assert!(matches!(err, TransportError::Other(_)));
    }
}
