//! 类型系统模块：定义网关线协议与工具描述的核心数据类型。
//!
//! # Types Module
//!
//! This module defines the wire-level types of the gateway: tool schemas used for
//! registration and discovery, and the request/response envelopes exchanged with
//! callers.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ToolSchema`] | Name, category, description and parameter declarations |
//! | [`ParamType`] | Primitive type tag for a declared parameter |
//! | [`ToolRequest`] | `{tool, request_id, parameters}` invocation request |
//! | [`Response`] | Success or error envelope with `execution_time_ms` |
//! | [`GatewayCall`] | Action envelope (`list_tools` / `invoke_tool`) accepted on `/mcp` |
//!
//! ## Example
//!
//! ```rust
//! use mcp_gateway::types::{ParamSpec, ParamType, ToolCategory, ToolSchema};
//!
//! let schema = ToolSchema::new("search", ToolCategory::Search)
//!     .with_description("Search for content based on a query")
//!     .with_parameter("query", ParamSpec::required(ParamType::String))
//!     .with_parameter("limit", ParamSpec::optional(ParamType::Integer));
//! assert_eq!(schema.parameters.len(), 2);
//! ```

pub mod tool;
pub mod wire;

pub use tool::{ParamSpec, ParamType, ParameterSpec, ToolCategory, ToolSchema};
pub use wire::{ErrorBody, GatewayCall, Parameters, Response, ToolRequest};
