//! Comparison targets.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::dispatcher::Dispatcher;
use crate::error_code::GatewayErrorCode;
use crate::transport::{GatewayReply, HttpTransport, TransportError};
use crate::types::{GatewayCall, Response};

/// What a target answered to one call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// Discovery answered with this many tools.
    Tools(usize),
    /// Invocation answered with an envelope.
    Envelope(Response),
}

impl CallOutcome {
    /// Failure detail for a non-success envelope.
    pub fn failure(&self) -> Option<SampleError> {
        match self {
            CallOutcome::Tools(_) => None,
            CallOutcome::Envelope(Response::Success { .. }) => None,
            CallOutcome::Envelope(Response::Error { error, .. }) => Some(SampleError::Envelope {
                code: error.code,
                message: error.message.clone(),
            }),
        }
    }
}

impl From<GatewayReply> for CallOutcome {
    fn from(reply: GatewayReply) -> Self {
        match reply {
            GatewayReply::Tools(tools) => CallOutcome::Tools(tools.len()),
            GatewayReply::Envelope(resp) => CallOutcome::Envelope(resp),
        }
    }
}

/// Why a comparison sample failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SampleError {
    /// The per-request deadline expired.
    Timeout { timeout_ms: u64 },
    /// Connection or protocol failure.
    Transport { message: String },
    /// The target answered with a non-200 status.
    HttpStatus { status: u16 },
    /// The target answered with an error envelope.
    Envelope {
        code: GatewayErrorCode,
        message: String,
    },
}

impl SampleError {
    /// Grouping key used for per-kind failure counts. Error envelopes group by code.
    pub fn kind(&self) -> String {
        match self {
            SampleError::Timeout { .. } => "timeout".to_string(),
            SampleError::Transport { .. } => "transport".to_string(),
            SampleError::HttpStatus { .. } => "http_status".to_string(),
            SampleError::Envelope { code, .. } => code.as_str().to_string(),
        }
    }

    /// Deadlines are enforced by the engine, so a transport error is never a timeout.
    pub(crate) fn from_transport(err: &TransportError) -> Self {
        match err {
            TransportError::Status(status) => SampleError::HttpStatus { status: *status },
            other => SampleError::Transport {
                message: other.to_string(),
            },
        }
    }
}

impl std::fmt::Display for SampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleError::Timeout { timeout_ms } => write!(f, "timed out after {} ms", timeout_ms),
            SampleError::Transport { message } => write!(f, "transport: {}", message),
            SampleError::HttpStatus { status } => write!(f, "HTTP status {}", status),
            SampleError::Envelope { code, message } => write!(f, "{}: {}", code, message),
        }
    }
}

/// A gateway deployment that can be driven by the comparison engine.
#[async_trait]
pub trait Endpoint: Send + Sync {
    fn label(&self) -> &str;

    async fn call(&self, call: &GatewayCall) -> Result<CallOutcome, TransportError>;
}

/// Remote gateway reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    label: String,
    transport: HttpTransport,
}

impl HttpEndpoint {
    pub fn new(label: impl Into<String>, base_url: &str) -> Result<Self, TransportError> {
        Ok(Self {
            label: label.into(),
            transport: HttpTransport::new(base_url)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }
}

#[async_trait]
impl Endpoint for HttpEndpoint {
    fn label(&self) -> &str {
        &self.label
    }

    async fn call(&self, call: &GatewayCall) -> Result<CallOutcome, TransportError> {
        self.transport.call(call).await.map(CallOutcome::from)
    }
}

/// In-process gateway, useful as a baseline without network overhead.
#[derive(Debug, Clone)]
pub struct LocalEndpoint {
    label: String,
    dispatcher: Arc<Dispatcher>,
}

impl LocalEndpoint {
    pub fn new(label: impl Into<String>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            label: label.into(),
            dispatcher,
        }
    }
}

#[async_trait]
impl Endpoint for LocalEndpoint {
    fn label(&self) -> &str {
        &self.label
    }

    async fn call(&self, call: &GatewayCall) -> Result<CallOutcome, TransportError> {
        Ok(match call {
            GatewayCall::ListTools => CallOutcome::Tools(self.dispatcher.list_tools().await.len()),
            GatewayCall::InvokeTool { data } => {
                CallOutcome::Envelope(self.dispatcher.handle(data).await)
            }
        })
    }
}
