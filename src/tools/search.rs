//! Simulated search tool.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{str_param, Tool, ToolError, ToolHandler};
use crate::types::{ParamSpec, ParamType, Parameters, ToolCategory, ToolSchema};

const DEFAULT_LIMIT: u64 = 10;
const MAX_RESULTS: u64 = 5;

/// Returns up to five canned results for a query.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchTool;

#[async_trait]
impl ToolHandler for SearchTool {
    async fn execute(&self, parameters: &Parameters) -> Result<Value, ToolError> {
        let query = str_param(parameters, "query").unwrap_or_default();
        if query.is_empty() {
            return Err(ToolError::invalid_input("Query parameter is required"));
        }
        let limit = parameters
            .get("limit")
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_LIMIT);

        let results: Vec<Value> = (1..=limit.min(MAX_RESULTS))
            .map(|i| {
                json!({
                    "id": i,
                    "title": format!("Result {} for '{}'", i, query),
                    "score": 1.0 - (i as f64 * 0.1),
                })
            })
            .collect();

        Ok(json!({
            "query": query,
            "count": results.len(),
            "results": results,
        }))
    }
}

impl Tool for SearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema::new("search", ToolCategory::Search)
            .with_description("Search for content based on a query")
            .with_parameter(
                "query",
                ParamSpec::required(ParamType::String).with_description("Search query"),
            )
            .with_parameter(
                "limit",
                ParamSpec::optional(ParamType::Integer)
                    .with_description("Maximum number of results"),
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
    async fn test_search_caps_results() {
        let out = SearchTool
            .execute(&params(json!({"query": "cats", "limit": 3})))
            .await
            .unwrap();
        assert_eq!(out["query"], "cats");
        assert_eq!(out["count"], 3);
        assert_eq!(out["results"][0]["title"], "Result 1 for 'cats'");

        let out = SearchTool
            .execute(&params(json!({"query": "cats"})))
            .await
            .unwrap();
        assert_eq!(out["count"], 5);
    }

    #[tokio::test]
    async fn test_empty_query_fails() {
        let err = SearchTool
            .execute(&params(json!({"query": ""})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
