//! Backend-restricted tools and the authorization gate for tool binding.
//!
//! The registry is built once at startup and injected into the graph; nothing
//! registers tools globally.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use langgraph::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};
use serde_json::{json, Value};

use crate::identity::{self, IdentityRecord};

/// A named function from JSON arguments to a result text.
#[async_trait]
pub trait BackendTool: Send + Sync {
    fn spec(&self) -> ToolSpec;

    async fn call(&self, arguments: Value) -> Result<String, ToolSourceError>;
}

/// `get_weather(location)`: deterministic demo tool.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeatherTool;

impl WeatherTool {
    pub const NAME: &'static str = "get_weather";
}

#[async_trait]
impl BackendTool for WeatherTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            Self::NAME,
            "Get the weather for a given location.",
            json!({
                "type": "object",
                "properties": {
                    "location": { "type": "string", "description": "City or place name" }
                },
                "required": ["location"]
            }),
        )
    }

    async fn call(&self, arguments: Value) -> Result<String, ToolSourceError> {
        let location = arguments
            .get("location")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolSourceError::InvalidInput("missing string field `location`".into()))?;
        Ok(format!("The weather for {location} is 70 degrees."))
    }
}

/// Ordered registry of backend tools, available to authenticated callers only.
#[derive(Clone, Default)]
pub struct BackendTools {
    order: Vec<String>,
    tools: HashMap<String, Arc<dyn BackendTool>>,
}

impl BackendTools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `get_weather` tool.
    pub fn with_defaults() -> Self {
        Self::new().with_tool(Arc::new(WeatherTool))
    }

    /// Adds a tool; a tool with the same name replaces the earlier one.
    pub fn with_tool(mut self, tool: Arc<dyn BackendTool>) -> Self {
        let name = tool.spec().name;
        if !self.tools.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tools.insert(name, tool);
        self
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.spec())
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }
}

#[async_trait]
impl ToolSource for BackendTools {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.specs())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolSourceError::NotFound(name.to_string()))?;
        let text = tool.call(arguments).await?;
        Ok(ToolCallContent { text })
    }
}

/// The tool set bound to one model invocation.
///
/// Caller tools are always bound. Backend tools are appended only for an
/// authenticated identity; a caller tool sharing a backend tool's name is then
/// dropped so the backend definition wins. Pure and idempotent.
pub fn bind_tools(
    identity: Option<&IdentityRecord>,
    caller_tools: &[ToolSpec],
    backend_tools: &[ToolSpec],
) -> Vec<ToolSpec> {
    if !identity::is_authenticated(identity) {
        return caller_tools.to_vec();
    }
    let mut bound: Vec<ToolSpec> = caller_tools
        .iter()
        .filter(|t| !backend_tools.iter().any(|b| b.name == t.name))
        .cloned()
        .collect();
    bound.extend(backend_tools.iter().cloned());
    bound
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tools: &[ToolSpec]) -> Vec<&str> {
        tools.iter().map(|t| t.name.as_str()).collect()
    }

    #[tokio::test]
    async fn weather_tool_formats_location() {
        let tools = BackendTools::with_defaults();
        let out = tools
            .call_tool("get_weather", json!({ "location": "Paris" }))
            .await
            .unwrap();
        assert_eq!(out.text, "The weather for Paris is 70 degrees.");
    }

    #[tokio::test]
    async fn weather_tool_rejects_missing_location() {
        let err = WeatherTool.call(json!({})).await.unwrap_err();
        assert!(matches!(err, ToolSourceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn unknown_backend_tool_is_not_found() {
        let err = BackendTools::with_defaults()
            .call_tool("launch", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolSourceError::NotFound(name) if name == "launch"));
    }

    #[test]
    fn anonymous_binding_excludes_backend_tools() {
        let caller = vec![ToolSpec::new("setTheme", "", json!({}))];
        let backend = BackendTools::with_defaults().specs();
        let anon = IdentityRecord::anonymous();
        assert_eq!(names(&bind_tools(Some(&anon), &caller, &backend)), ["setTheme"]);
        assert_eq!(names(&bind_tools(None, &caller, &backend)), ["setTheme"]);
    }

    #[test]
    fn authenticated_binding_is_idempotent_and_backend_wins_on_clash() {
        let caller = vec![
            ToolSpec::new("setTheme", "", json!({})),
            ToolSpec::new("get_weather", "client copy", json!({})),
        ];
        let backend = BackendTools::with_defaults().specs();
        let user = IdentityRecord::new("u1");
        let first = bind_tools(Some(&user), &caller, &backend);
        let second = bind_tools(Some(&user), &caller, &backend);
        assert_eq!(first, second);
        assert_eq!(names(&first), ["setTheme", "get_weather"]);
        assert_eq!(first[1], backend[0]);
    }
}
