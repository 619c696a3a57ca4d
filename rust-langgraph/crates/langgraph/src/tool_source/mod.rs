//! Tool source abstraction: list tools and call a tool.
//!
//! Graph nodes depend on `ToolSource` instead of a concrete registry, so the
//! set of executable tools is whatever the application injects.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Tool specification: what the model sees when a tool is bound.
///
/// Serializable so callers can supply their own tool descriptors over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema of the arguments.
    #[serde(default = "empty_object_schema", alias = "parameters")]
    pub input_schema: Value,
}

fn empty_object_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            input_schema,
        }
    }
}

/// Result of a single tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallContent {
    pub text: String,
}

/// Errors from listing or calling tools.
#[derive(Debug, Error)]
pub enum ToolSourceError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("tool execution failed: {0}")]
    Execution(String),
}

/// Tool source: list tools and call a tool by name.
///
/// **Interaction**: chat nodes read `list_tools()` to bind tools to the model;
/// tool nodes call `call_tool(name, args)` for each requested call.
#[async_trait]
pub trait ToolSource: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError>;

    async fn call_tool(&self, name: &str, arguments: Value)
        -> Result<ToolCallContent, ToolSourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_spec_accepts_parameters_alias_and_defaults_schema() {
        let spec: ToolSpec = serde_json::from_str(
            r#"{"name":"setTheme","parameters":{"type":"object","properties":{"theme":{"type":"string"}}}}"#,
        )
        .unwrap();
        assert_eq!(spec.name, "setTheme");
        assert_eq!(spec.input_schema["properties"]["theme"]["type"], "string");

        let bare: ToolSpec = serde_json::from_str(r#"{"name":"ping"}"#).unwrap();
        assert_eq!(bare.description, None);
        assert_eq!(bare.input_schema["type"], "object");
    }
}
