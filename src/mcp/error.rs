//! MCP server error types.

use thiserror::Error;

/// Result type for MCP operations.
pub type McpResult<T> = Result<T, McpError>;

/// Protocol-level failures, reported to the client as JSON-RPC errors.
///
/// Failures inside a tool (API errors, auth errors) are not `McpError`s;
/// they travel back as a tool result with `isError` set.
#[derive(Debug, Error)]
pub enum McpError {
    /// The request line was not JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// The request was JSON but not a valid JSON-RPC 2.0 request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unknown method: {0}")]
    UnknownMethod(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Tool arguments did not match the tool's schema.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl McpError {
    /// Returns the JSON-RPC error code for this error.
    ///
    /// Error codes follow JSON-RPC 2.0 conventions:
    /// - -32700: Parse error
    /// - -32600: Invalid request
    /// - -32601: Method not found
    /// - -32602: Invalid params
    /// - -32603: Internal error
    pub fn error_code(&self) -> i32 {
        match self {
            Self::Parse(_) => -32700,
            Self::InvalidRequest(_) => -32600,
            Self::UnknownMethod(_) | Self::UnknownTool(_) => -32601,
            Self::InvalidParameters(_) => -32602,
            Self::Internal(_) => -32603,
        }
    }
}

impl From<serde_json::Error> for McpError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidParameters(e.to_string())
    }
}
