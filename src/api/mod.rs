//! Vanta API tools
//!
//! Each submodule builds request URLs for one resource family and
//! registers its tools with the MCP registry.

pub mod client;
mod controls;
mod documents;
mod frameworks;
mod groups;
mod people;

use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use url::Url;

use crate::error::{Error, Result};
use crate::mcp::{CallToolResult, McpError, ToolDefinition, ToolHandlerFn, ToolRegistry};
use client::VantaClient;

/// Register every Vanta tool against `client`.
pub fn register_tools(registry: &mut ToolRegistry, client: &Arc<VantaClient>) {
    automated_tests::register(registry, client);
    frameworks::register(registry, client);
    controls::register(registry, client);
    people::register(registry, client);
    groups::register(registry, client);
    documents::register(registry, client);
}

/// Wire a typed handler into the registry.
///
/// Arguments that do not deserialize into `A` are reported as invalid
/// parameters; errors from the handler (token acquisition, unreachable
/// API) become an error result the agent can read.
fn add_tool<A, F, Fut>(
    registry: &mut ToolRegistry,
    client: &Arc<VantaClient>,
    definition: ToolDefinition,
    run: F,
) where
    A: DeserializeOwned + Send + 'static,
    F: Fn(Arc<VantaClient>, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<CallToolResult>> + Send + 'static,
{
    let client = client.clone();
    let run = Arc::new(run);
    let name = definition.name.clone();

    let handler: ToolHandlerFn = Arc::new(move |args: serde_json::Value| {
        let client = client.clone();
        let run = run.clone();
        let name = name.clone();
        async move {
            let input: A = serde_json::from_value(args)
                .map_err(|e| McpError::InvalidParameters(format!("{}: {}", name, e)))?;

            Ok::<_, McpError>(match run.as_ref()(client, input).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(tool = %name, "Tool failed: {}", e);
                    CallToolResult::error(e.to_string())
                }
            })
        }
        .boxed()
    });

    registry.register(definition, handler);
}

/// Cursor pagination shared by the list endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Page {
    pub page_size: Option<u32>,
    pub page_cursor: Option<String>,
}

impl Page {
    pub fn apply(&self, url: &mut Url) {
        append_param(url, "pageSize", self.page_size.as_ref());
        append_param(url, "pageCursor", self.page_cursor.as_ref());
    }
}

/// `/v1/<segments...>` with each segment percent-encoded.
///
/// Empty, `.` and `..` segments are rejected; URL parsing would collapse
/// them (even when written as `%2E`) and address a different resource.
pub(crate) fn resource_url(client: &VantaClient, segments: &[&str]) -> Result<Url> {
    if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
        return Err(Error::InvalidArgument(format!(
            "'{}' is not a valid resource ID",
            bad
        )));
    }

    let mut url = client.endpoint("/v1");
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}

pub(crate) fn append_param<T: Display>(url: &mut Url, key: &str, value: Option<T>) {
    if let Some(value) = value {
        url.query_pairs_mut().append_pair(key, &value.to_string());
    }
}

/// Turn an API response into a tool result.
///
/// Success bodies are passed through as compact JSON text after `shape`
/// has had a chance to trim them; failures become an error result naming
/// the URL and status.
pub(crate) async fn render_response(
    url: &Url,
    resp: reqwest::Response,
    shape: fn(&mut serde_json::Value),
) -> Result<CallToolResult> {
    let status = resp.status();
    if !status.is_success() {
        tracing::debug!("HTTP {} for {}", status.as_u16(), url);
        return Ok(CallToolResult::error(format!("Url: {}, Error: {}", url, status)));
    }

    let body = resp.text().await.map_err(|e| Error::upstream(&e))?;
    if body.trim().is_empty() {
        return Ok(CallToolResult::text("{}"));
    }

    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(mut value) => {
            shape(&mut value);
            Ok(CallToolResult::text(value.to_string()))
        }
        Err(e) => Ok(CallToolResult::error(format!(
            "Url: {}, Error: response is not valid JSON ({})",
            url, e
        ))),
    }
}

/// Leave the body untouched.
pub(crate) fn as_is(_: &mut serde_json::Value) {}

/// Object schema with the given properties and required keys.
pub(crate) fn object_schema(properties: serde_json::Value, required: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Object schema that also accepts `pageSize` and `pageCursor`.
pub(crate) fn paged_schema(
    mut properties: serde_json::Value,
    required: &[&str],
    noun: &str,
) -> serde_json::Value {
    if let Some(props) = properties.as_object_mut() {
        props.insert(
            "pageSize".to_string(),
            serde_json::json!({
                "type": "integer",
                "minimum": 1,
                "maximum": 100,
                "description": format!("Number of {} to return (1-100, default 10)", noun),
            }),
        );
        props.insert(
            "pageCursor".to_string(),
            serde_json::json!({
                "type": "string",
                "description": "Pagination cursor for the next page. Leave blank to start from the first page.",
            }),
        );
    }
    object_schema(properties, required)
}
