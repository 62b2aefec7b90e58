//! Request/response envelopes exchanged with callers

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error_code::GatewayErrorCode;

/// Tool parameters as supplied by the caller.
pub type Parameters = Map<String, Value>;

fn generated_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Tool invocation request.
///
/// `request_id` is used for correlation only. When a caller omits it on the wire a
/// UUID v4 is generated during deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    #[serde(alias = "tool_name")]
    pub tool: String,
    #[serde(default = "generated_request_id")]
    pub request_id: String,
    #[serde(default)]
    pub parameters: Parameters,
}

impl ToolRequest {
    pub fn new(tool: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            request_id: request_id.into(),
            parameters: Parameters::new(),
        }
    }

    /// Request with a freshly generated id.
    pub fn with_generated_id(tool: impl Into<String>) -> Self {
        Self::new(tool, generated_request_id())
    }

    pub fn with_param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    /// Replace all parameters. Non-object values yield an empty parameter set.
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = match parameters {
            Value::Object(map) => map,
            _ => Parameters::new(),
        };
        self
    }
}

/// `{code, message}` carried by error envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: GatewayErrorCode,
    pub message: String,
}

/// Uniform response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Success {
        request_id: String,
        data: Value,
        execution_time_ms: f64,
    },
    Error {
        request_id: String,
        error: ErrorBody,
        execution_time_ms: f64,
    },
}

impl Response {
    pub fn request_id(&self) -> &str {
        match self {
            Response::Success { request_id, .. } | Response::Error { request_id, .. } => {
                request_id
            }
        }
    }

    pub fn execution_time_ms(&self) -> f64 {
        match self {
            Response::Success {
                execution_time_ms, ..
            }
            | Response::Error {
                execution_time_ms, ..
            } => *execution_time_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    pub fn error_code(&self) -> Option<GatewayErrorCode> {
        match self {
            Response::Error { error, .. } => Some(error.code),
            Response::Success { .. } => None,
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Response::Success { data, .. } => Some(data),
            Response::Error { .. } => None,
        }
    }
}

/// Action envelope accepted by the `/mcp` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GatewayCall {
    ListTools,
    InvokeTool { data: ToolRequest },
}

impl GatewayCall {
    pub fn invoke(request: ToolRequest) -> Self {
        GatewayCall::InvokeTool { data: request }
    }

    pub fn action(&self) -> &'static str {
        match self {
            GatewayCall::ListTools => "list_tools",
            GatewayCall::InvokeTool { .. } => "invoke_tool",
        }
    }
}
