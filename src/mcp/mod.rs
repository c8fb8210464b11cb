//! Model Context Protocol server
//!
//! JSON-RPC 2.0 over stdio. Supported methods:
//!
//! - `initialize`: Initialize the MCP session
//! - `ping`
//! - `tools/list`: List available tools
//! - `tools/call`: Execute a tool

mod error;
mod server;
mod tool;
mod transport;

pub use error::McpError;
pub use server::McpServer;
pub use tool::{CallToolResult, ToolDefinition, ToolHandlerFn, ToolRegistry};
pub use transport::serve_stdio;
