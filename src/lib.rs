//! # mcp-gateway
//!
//! 工具调用网关：对结构化的工具调用请求做模式校验、路由到具名处理器执行，并返回带执行耗时的统一信封。
//!
//! Tool-invocation gateway. Callers discover the registered tools and invoke them
//! through one uniform contract, whichever tool or backend answers.
//!
//! ## Overview
//!
//! A request names a tool and carries parameters. The [`Dispatcher`] resolves the tool
//! in the [`ToolRegistry`], validates the parameters against the tool's declared
//! schema, invokes the handler, and answers with exactly one envelope:
//!
//! ```text
//! Success: { status: "success", request_id, data, execution_time_ms }
//! Error:   { status: "error", request_id, error: { code, message }, execution_time_ms }
//! ```
//!
//! The [`compare`] module drives identical workloads against two deployed gateways
//! and reports latency distributions, reliability and a head-to-head verdict.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use mcp_gateway::{tools, Dispatcher, ToolRequest};
//!
//! # #[tokio::main]
//! # async fn main() -> mcp_gateway::Result<()> {
//! let registry = Arc::new(tools::default_registry()?);
//! let dispatcher = Dispatcher::new(registry);
//!
//! let request = ToolRequest::new("search", "r1")
//!     .with_param("query", serde_json::json!("cats"));
//! let response = dispatcher.handle(&request).await;
//! assert!(response.is_success());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Tool schemas and the request/response wire types |
//! | [`validation`] | Parameter validation against a tool schema |
//! | [`registry`] | Append-only name to handler mapping |
//! | [`dispatcher`] | Lookup, validation, invocation and timing |
//! | [`envelope`] | Success/error envelope construction |
//! | [`tools`] | Handler interface and built-in stand-in tools |
//! | [`telemetry`] | Invocation records and sinks |
//! | [`config`] | YAML and environment configuration |
//! | [`transport`] | HTTP client for remote gateways |
//! | [`compare`] | Deployment comparison engine |
//! | [`server`] | axum HTTP binding (feature `server`) |

pub mod compare;
pub mod config;
pub mod dispatcher;
pub mod envelope;
pub mod error_code;
pub mod registry;
pub mod telemetry;
pub mod tools;
pub mod transport;
pub mod types;
pub mod validation;

#[cfg(feature = "server")]
pub mod server;

pub use config::GatewayConfig;
pub use dispatcher::Dispatcher;
pub use error_code::GatewayErrorCode;
pub use registry::{RegistryError, ToolRegistry};
pub use tools::{Tool, ToolError, ToolHandler};
pub use types::{
    GatewayCall, ParamSpec, ParamType, Parameters, ParameterSpec, Response, ToolCategory,
    ToolRequest, ToolSchema,
};
pub use validation::{SchemaValidator, UnknownParameters, ValidationFailure};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

// Re-export error types
pub mod error;
pub use error::{Error, ErrorContext};
