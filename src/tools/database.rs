//! Simulated database tool.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{str_param, Tool, ToolError, ToolHandler};
use crate::types::{ParamSpec, ParamType, Parameters, ToolCategory, ToolSchema};

const OPERATIONS: [&str; 4] = ["query", "insert", "update", "delete"];

/// Answers table operations with canned rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatabaseTool;

#[async_trait]
impl ToolHandler for DatabaseTool {
    async fn execute(&self, parameters: &Parameters) -> Result<Value, ToolError> {
        let (operation, table) = match (
            str_param(parameters, "operation"),
            str_param(parameters, "table"),
        ) {
            (Some(op), Some(table)) if !op.is_empty() && !table.is_empty() => (op, table),
            _ => {
                return Err(ToolError::invalid_input(
                    "Operation and table parameters are required",
                ))
            }
        };
        if !OPERATIONS.contains(&operation) {
            return Err(ToolError::invalid_input(format!(
                "Unknown operation: {}",
                operation
            )));
        }

        if operation == "query" {
            let rows: Vec<Value> = (1..=5)
                .map(|i| json!({ "id": i, "name": format!("Record {}", i) }))
                .collect();
            return Ok(json!({
                "operation": operation,
                "table": table,
                "affected_rows": 5,
                "data": rows,
            }));
        }

        let data = parameters.get("data").cloned().unwrap_or_else(|| json!({}));
        Ok(json!({
            "operation": operation,
            "table": table,
            "affected_rows": 1,
            "data": data,
        }))
    }
}

impl Tool for DatabaseTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema::new("database", ToolCategory::Database)
            .with_description("Query database for records")
            .with_parameter(
                "operation",
                ParamSpec::required(ParamType::String)
                    .with_description("Database operation: query, insert, update or delete"),
            )
            .with_parameter(
                "table",
                ParamSpec::required(ParamType::String).with_description("Table name"),
            )
            .with_parameter(
                "data",
                ParamSpec::optional(ParamType::Object).with_description("Operation data"),
            )
    }
}
