//! MCP server implementation.
//!
//! Implements the Model Context Protocol (MCP) for LLM tool access.
//! Uses JSON-RPC 2.0 for the transport layer.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::McpError;
use super::tool::{CallToolResult, ToolRegistry};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "vanta-mcp";

const SERVER_INSTRUCTIONS: &str = "Model Context Protocol server for Vanta's automated security \
    compliance platform. Provides access to security tests, compliance frameworks, and security \
    controls for SOC 2, ISO 27001, HIPAA, GDPR and other standards.";

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request ID; absent for notifications. An explicit `null` is kept
    /// as `Some(Value::Null)` and still gets a response.
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<Value>,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: Value,
}

fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version.
    pub jsonrpc: String,
    /// Request ID (matches request).
    pub id: Value,
    /// Result (present on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error (present on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i32,
    /// Error message.
    pub message: String,
}

impl JsonRpcResponse {
    /// Creates a success response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Creates an error response from an `McpError`.
    pub fn from_mcp_error(id: Value, error: &McpError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code: error.error_code(),
                message: error.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// MCP server dispatching JSON-RPC requests to registered tools.
pub struct McpServer {
    tools: ToolRegistry,
}

impl McpServer {
    pub fn new(tools: ToolRegistry) -> Self {
        Self { tools }
    }

    /// Handles one JSON-RPC message. Notifications yield `None`.
    pub async fn handle_request(&self, request: &str) -> Option<String> {
        let response = match serde_json::from_str::<JsonRpcRequest>(request) {
            Ok(req) => self.dispatch(req).await?,
            Err(e) => {
                let err = if serde_json::from_str::<Value>(request).is_ok() {
                    McpError::InvalidRequest(e.to_string())
                } else {
                    McpError::Parse(e.to_string())
                };
                JsonRpcResponse::from_mcp_error(Value::Null, &err)
            }
        };

        Some(serde_json::to_string(&response).unwrap_or_else(|_| {
            r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"serialization failed"}}"#.to_string()
        }))
    }

    async fn dispatch(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            tracing::debug!(method = %request.method, "Notification received");
            return None;
        };

        if request.jsonrpc != "2.0" {
            let err = McpError::InvalidRequest("invalid JSON-RPC version".to_string());
            return Some(JsonRpcResponse::from_mcp_error(id, &err));
        }

        let result = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => Ok(self.handle_list_tools()),
            "tools/call" => self.handle_tool_call(request.params).await,
            other => Err(McpError::UnknownMethod(other.to_string())),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => {
                tracing::warn!(method = %request.method, "Request failed: {}", e);
                JsonRpcResponse::from_mcp_error(id, &e)
            }
        })
    }

    fn handle_initialize(&self) -> Value {
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {}
            },
            "instructions": SERVER_INSTRUCTIONS
        })
    }

    fn handle_list_tools(&self) -> Value {
        let tools: Vec<&_> = self.tools.definitions().collect();
        serde_json::json!({ "tools": tools })
    }

    async fn handle_tool_call(&self, params: Value) -> Result<Value, McpError> {
        let params: ToolCallParams = serde_json::from_value(params)?;
        let arguments = params
            .arguments
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        tracing::info!(tool = %params.name, "Tool call");
        let result: CallToolResult = self.tools.call(&params.name, arguments).await?;
        if result.is_error {
            tracing::warn!(tool = %params.name, "Tool returned an error result");
        }

        serde_json::to_value(result).map_err(|e| McpError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::tool::{ToolDefinition, ToolHandlerFn};
    use futures::FutureExt;
    use std::sync::Arc;

    fn create_test_server() -> McpServer {
        let mut tools = ToolRegistry::new();
        let handler: ToolHandlerFn = Arc::new(|args: Value| {
            async move {
                let result = match args.get("fail").and_then(Value::as_bool) {
                    Some(true) => CallToolResult::error("upstream said no"),
                    _ => CallToolResult::text(args.to_string()),
                };
                Ok::<_, McpError>(result)
            }
            .boxed()
        });
        tools.register(
            ToolDefinition::new("get_things", "List things", serde_json::json!({"type": "object"})),
            handler,
        );
        McpServer::new(tools)
    }

    async fn call(server: &McpServer, request: &str) -> JsonRpcResponse {
        let response = server.handle_request(request).await.unwrap();
        serde_json::from_str(&response).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let server = create_test_server();

        let parsed = call(
            &server,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        )
        .await;
        assert!(parsed.error.is_none());

        let result = parsed.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "vanta-mcp");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_list_tools() {
        let server = create_test_server();

        let parsed = call(&server, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;
        let result = parsed.result.unwrap();
        let tools = result["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "get_things");
        assert_eq!(tools[0]["inputSchema"]["type"], "object");
    }

    #[tokio::test]
    async fn test_tool_call_passes_arguments() {
        let server = create_test_server();

        let parsed = call(
            &server,
            r#"{"jsonrpc":"2.0","id":"a","method":"tools/call","params":{"name":"get_things","arguments":{"pageSize":5}}}"#,
        )
        .await;
        assert_eq!(parsed.id, serde_json::json!("a"));

        let result = parsed.result.unwrap();
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], r#"{"pageSize":5}"#);
        assert!(result.get("isError").is_none());
    }

    #[tokio::test]
    async fn test_tool_error_is_a_result_not_a_protocol_error() {
        let server = create_test_server();

        let parsed = call(
            &server,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"get_things","arguments":{"fail":true}}}"#,
        )
        .await;
        assert!(parsed.error.is_none());
        assert_eq!(parsed.result.unwrap()["isError"], true);
    }

    #[tokio::test]
    async fn test_missing_arguments_default_to_empty_object() {
        let server = create_test_server();

        let parsed = call(
            &server,
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"get_things"}}"#,
        )
        .await;
        assert_eq!(parsed.result.unwrap()["content"][0]["text"], "{}");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let server = create_test_server();

        let parsed = call(
            &server,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"drop_tables"}}"#,
        )
        .await;
        assert_eq!(parsed.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let server = create_test_server();

        let parsed = call(
            &server,
            r#"{"jsonrpc":"2.0","id":6,"method":"unknown/method","params":{}}"#,
        )
        .await;
        assert_eq!(parsed.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let server = create_test_server();

        let parsed = call(&server, "not valid json").await;
        assert_eq!(parsed.error.unwrap().code, -32700);
        assert_eq!(parsed.id, Value::Null);
    }

    #[tokio::test]
    async fn test_invalid_request_shape() {
        let server = create_test_server();

        let parsed = call(&server, r#"{"jsonrpc":"2.0","id":7}"#).await;
        assert_eq!(parsed.error.unwrap().code, -32600);

        let parsed = call(&server, r#"{"jsonrpc":"1.0","id":8,"method":"ping"}"#).await;
        assert_eq!(parsed.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let server = create_test_server();

        let response = server
            .handle_request(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_null_id_is_answered_not_treated_as_notification() {
        let server = create_test_server();

        let response = server
            .handle_request(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#)
            .await
            .expect("a request with a null id must be answered");
        let parsed: JsonRpcResponse = serde_json::from_str(&response).unwrap();
        assert_eq!(parsed.id, Value::Null);
        assert_eq!(parsed.result.unwrap(), serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_ping() {
        let server = create_test_server();

        let parsed = call(&server, r#"{"jsonrpc":"2.0","id":9,"method":"ping"}"#).await;
        assert_eq!(parsed.result.unwrap(), serde_json::json!({}));
    }
}
