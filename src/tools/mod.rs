//! 工具处理器模块：定义工具能力接口与内置的演示工具。
//!
//! # Tool Handlers
//!
//! A tool is anything implementing [`ToolHandler`]: an async `execute` taking the
//! caller's parameters and returning a JSON result or a [`ToolError`]. Handlers that
//! also carry a static schema descriptor implement [`Tool`] and can be registered
//! with [`ToolRegistry::register_tool`].
//!
//! The built-in tools (`search`, `database`, `file_ops`) are synchronous stand-ins:
//! they return simulated payloads and never touch a real index, database or
//! filesystem.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ToolHandler`] | Capability interface invoked by the dispatcher |
//! | [`Tool`] | Handler plus static [`ToolSchema`] |
//! | [`handler_fn`] | Adapts an async closure into a handler |
//! | [`default_registry`] | Registry with the built-in tools |
//!
//! [`ToolRegistry::register_tool`]: crate::registry::ToolRegistry::register_tool

mod database;
mod file_ops;
mod search;

pub use database::DatabaseTool;
pub use file_ops::FileOpsTool;
pub use search::SearchTool;

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use thiserror::Error;

use crate::registry::{RegistryError, ToolRegistry};
use crate::types::{Parameters, ToolSchema};

/// Failure raised by a tool handler.
///
/// The dispatcher never forwards these messages to callers; they are logged and
/// replaced by a sanitized `EXECUTION_ERROR` envelope.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("execution failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ToolError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ToolError::InvalidInput(msg.into())
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        ToolError::Failed(msg.into())
    }
}

/// Capability interface for anything the gateway can invoke.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn execute(&self, parameters: &Parameters) -> Result<Value, ToolError>;
}

/// A handler with a static schema descriptor.
pub trait Tool: ToolHandler {
    fn schema(&self) -> ToolSchema;
}

/// Handler backed by an async closure.
pub struct FnHandler<F> {
    f: F,
}

/// Wrap an async closure as a [`ToolHandler`].
///
/// ```rust
/// use mcp_gateway::tools::{handler_fn, ToolError};
///
/// let handler = handler_fn(|params| async move {
///     Ok::<_, ToolError>(serde_json::json!({ "echo": params }))
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Parameters) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ToolError>> + Send,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> ToolHandler for FnHandler<F>
where
    F: Fn(Parameters) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ToolError>> + Send,
{
    async fn execute(&self, parameters: &Parameters) -> Result<Value, ToolError> {
        (self.f)(parameters.clone()).await
    }
}

/// Registry holding the built-in tools, in the order `search`, `database`, `file_ops`.
pub fn default_registry() -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    register_builtin(&mut registry)?;
    Ok(registry)
}

/// Register the built-in tools into an existing registry.
pub fn register_builtin(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    registry.register_tool(SearchTool)?;
    registry.register_tool(DatabaseTool)?;
    registry.register_tool(FileOpsTool)?;
    Ok(())
}

fn str_param<'a>(parameters: &'a Parameters, key: &str) -> Option<&'a str> {
    parameters.get(key).and_then(|v| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_order() {
        let registry = default_registry().unwrap();
        let names: Vec<_> = registry.schemas().map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["search", "database", "file_ops"]);
    }

    #[test]
    fn test_builtin_twice_is_duplicate() {
        let mut registry = default_registry().unwrap();
        let err = register_builtin(&mut registry).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTool { ref name } if name == "search"));
    }

    #[tokio::test]
    async fn test_handler_fn_receives_parameters() {
        let handler = handler_fn(|params| async move {
            Ok::<_, ToolError>(Value::from(params.len()))
        });
        let mut params = Parameters::new();
        params.insert("a".into(), Value::Bool(true));
        assert_eq!(handler.execute(&params).await.unwrap(), Value::from(1));
    }
}
