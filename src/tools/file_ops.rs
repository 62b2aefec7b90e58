//! Simulated file operations tool. Nothing here touches the real filesystem.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{str_param, Tool, ToolError, ToolHandler};
use crate::types::{ParamSpec, ParamType, Parameters, ToolCategory, ToolSchema};

const SIMULATED_FILE_SIZE: u64 = 1024;

#[derive(Debug, Clone, Copy, Default)]
pub struct FileOpsTool;

#[async_trait]
impl ToolHandler for FileOpsTool {
    async fn execute(&self, parameters: &Parameters) -> Result<Value, ToolError> {
        let (operation, path) = match (
            str_param(parameters, "operation"),
            str_param(parameters, "path"),
        ) {
            (Some(op), Some(path)) if !op.is_empty() && !path.is_empty() => (op, path),
            _ => {
                return Err(ToolError::invalid_input(
                    "Operation and path parameters are required",
                ))
            }
        };

        match operation {
            "read" => Ok(json!({
                "operation": operation,
                "path": path,
                "content": format!("Simulated content of {}", path),
                "size": SIMULATED_FILE_SIZE,
            })),
            "write" => {
                let content = str_param(parameters, "content").unwrap_or_default();
                if content.is_empty() {
                    return Err(ToolError::invalid_input(
                        "Content parameter is required for write operation",
                    ));
                }
                Ok(json!({
                    "operation": operation,
                    "path": path,
                    "bytes_written": content.len(),
                }))
            }
            "list" => {
                let files: Vec<String> = (1..=3).map(|i| format!("file_{}.txt", i)).collect();
                Ok(json!({
                    "operation": operation,
                    "path": path,
                    "count": files.len(),
                    "files": files,
                }))
            }
            "delete" => Ok(json!({
                "operation": operation,
                "path": path,
                "deleted": true,
            })),
            other => Err(ToolError::invalid_input(format!(
                "Unknown operation: {}",
                other
            ))),
        }
    }
}

impl Tool for FileOpsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema::new("file_ops", ToolCategory::FileOps)
            .with_description("Perform file operations (read, write, list, delete)")
            .with_parameter(
                "operation",
                ParamSpec::required(ParamType::String)
                    .with_description("File operation: read, write, list or delete"),
            )
            .with_parameter(
                "path",
                ParamSpec::required(ParamType::String).with_description("File or directory path"),
            )
            .with_parameter(
                "content",
                ParamSpec::optional(ParamType::String)
                    .with_description("Content to write (for write operation)"),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(v: Value) -> Parameters {
        v.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_list_and_read() {
        let out = FileOpsTool
            .execute(&params(json!({"operation": "list", "path": "/tmp"})))
            .await
            .unwrap();
        assert_eq!(out["count"], 3);
        assert_eq!(out["files"][2], "file_3.txt");

        let out = FileOpsTool
            .execute(&params(json!({"operation": "read", "path": "/etc/motd"})))
            .await
            .unwrap();
        assert_eq!(out["content"], "Simulated content of /etc/motd");
    }

    #[tokio::test]
    async fn test_write_requires_content() {
        let err = FileOpsTool
            .execute(&params(json!({"operation": "write", "path": "a.txt"})))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Content parameter is required"));

        let out = FileOpsTool
            .execute(&params(json!({"operation": "write", "path": "a.txt", "content": "hello"})))
            .await
            .unwrap();
        assert_eq!(out["bytes_written"], 5);
    }
}
