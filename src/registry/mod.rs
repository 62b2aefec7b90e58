//! 工具注册表 — 按名称登记工具处理器及其参数规格
//!
//! Tool registry mapping tool names to handlers and their declared schemas.
//!
//! Registration happens once, during startup, on an owned `ToolRegistry`. The
//! registry is then frozen by moving it into an `Arc` shared with the dispatcher;
//! there is no unregistration, so lookups never race with mutation.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::error_code::GatewayErrorCode;
use crate::tools::{Tool, ToolHandler};
use crate::types::ToolSchema;

/// Registration or lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Tool '{name}' is already registered")]
    DuplicateTool { name: String },

    #[error("Tool '{name}' not found")]
    ToolNotFound { name: String },
}

impl RegistryError {
    pub fn code(&self) -> GatewayErrorCode {
        match self {
            RegistryError::DuplicateTool { .. } => GatewayErrorCode::DuplicateTool,
            RegistryError::ToolNotFound { .. } => GatewayErrorCode::ToolNotFound,
        }
    }
}

/// A registered handler together with its immutable schema.
#[derive(Clone)]
pub struct RegisteredTool {
    schema: ToolSchema,
    handler: Arc<dyn ToolHandler>,
}

impl RegisteredTool {
    pub fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    pub fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Append-only tool registry preserving registration order.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `schema.name`.
    pub fn register(
        &mut self,
        schema: ToolSchema,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), RegistryError> {
        if self.index.contains_key(&schema.name) {
            return Err(RegistryError::DuplicateTool { name: schema.name });
        }
        tracing::debug!(tool = %schema.name, category = ?schema.category, "registered tool");
        self.index.insert(schema.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool { schema, handler });
        Ok(())
    }

    /// Register a handler that carries its own schema descriptor.
    pub fn register_tool<T>(&mut self, tool: T) -> Result<(), RegistryError>
    where
        T: Tool + 'static,
    {
        let schema = tool.schema();
        self.register(schema, Arc::new(tool))
    }

    pub fn lookup(&self, name: &str) -> Result<&RegisteredTool, RegistryError> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| RegistryError::ToolNotFound {
                name: name.to_string(),
            })
    }

    /// Schemas in registration order.
    pub fn list(&self) -> Vec<ToolSchema> {
        self.schemas().cloned().collect()
    }

    pub fn schemas(&self) -> impl Iterator<Item = &ToolSchema> {
        self.tools.iter().map(|t| &t.schema)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
