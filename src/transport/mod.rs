//! 传输层：通过 HTTP 调用远端网关的 `/mcp` 动作端点。
//!
//! Client side of the gateway wire contract, used by the comparison engine to drive
//! deployed gateways.

pub mod http;

pub use http::{GatewayReply, HttpTransport};

/// Failure to obtain a well-formed reply from a remote gateway.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Other(String),
}
