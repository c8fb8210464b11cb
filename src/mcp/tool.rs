//! MCP tool definitions, results and the registry handlers are added to.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::error::{McpError, McpResult};

/// Name, description and JSON Schema advertised through `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    pub fn new(name: &str, description: &str, input_schema: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

/// Payload of a successful `tools/call` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl CallToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// A tool-level failure the calling agent can read and react to.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            is_error: true,
        }
    }

    /// Text of the first content item.
    #[cfg(test)]
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|c| match c {
            Content::Text { text } => text.as_str(),
        })
    }
}

/// Async handler invoked with the raw `arguments` object of a tool call.
pub type ToolHandlerFn =
    Arc<dyn Fn(serde_json::Value) -> BoxFuture<'static, McpResult<CallToolResult>> + Send + Sync>;

struct RegisteredTool {
    definition: ToolDefinition,
    handler: ToolHandlerFn,
}

/// Tools by name, listed in name order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A later registration under the same name replaces
    /// the earlier one.
    pub fn register(&mut self, definition: ToolDefinition, handler: ToolHandlerFn) {
        tracing::debug!(tool = %definition.name, "Registered tool");
        self.tools.insert(
            definition.name.clone(),
            RegisteredTool {
                definition,
                handler,
            },
        );
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values().map(|t| &t.definition)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub async fn call(&self, name: &str, arguments: serde_json::Value) -> McpResult<CallToolResult> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| McpError::UnknownTool(name.to_string()))?;
        (tool.handler)(arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    fn echo_tool() -> (ToolDefinition, ToolHandlerFn) {
        let definition = ToolDefinition::new(
            "echo",
            "Echo the message argument",
            serde_json::json!({"type": "object", "properties": {"message": {"type": "string"}}}),
        );
        let handler: ToolHandlerFn = Arc::new(|args: serde_json::Value| {
            async move {
                let message = args
                    .get("message")
                    .and_then(|m| m.as_str())
                    .ok_or_else(|| McpError::InvalidParameters("message is required".into()))?;
                Ok::<_, McpError>(CallToolResult::text(message))
            }
            .boxed()
        });
        (definition, handler)
    }

    #[tokio::test]
    async fn test_registry_dispatches_by_name() {
        let mut registry = ToolRegistry::new();
        let (definition, handler) = echo_tool();
        registry.register(definition, handler);

        let result = registry
            .call("echo", serde_json::json!({"message": "hi"}))
            .await
            .unwrap();
        assert_eq!(result.first_text(), Some("hi"));
        assert!(!result.is_error);

        let err = registry.call("nope", serde_json::json!({})).await.unwrap_err();
        assert_eq!(err.error_code(), -32601);

        let err = registry.call("echo", serde_json::json!({})).await.unwrap_err();
        assert_eq!(err.error_code(), -32602);
    }

    #[test]
    fn test_call_tool_result_wire_shape() {
        let ok = serde_json::to_value(CallToolResult::text("{}")).unwrap();
        assert_eq!(ok, serde_json::json!({"content": [{"type": "text", "text": "{}"}]}));

        let err = serde_json::to_value(CallToolResult::error("boom")).unwrap();
        assert_eq!(
            err,
            serde_json::json!({"content": [{"type": "text", "text": "boom"}], "isError": true})
        );
    }

    #[test]
    fn test_definition_serializes_input_schema_in_camel_case() {
        let (definition, _) = echo_tool();
        let value = serde_json::to_value(&definition).unwrap();
        assert_eq!(value["name"], "echo");
        assert!(value.get("inputSchema").is_some());
    }
}
