//! Security controls and the tests that validate them

use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::client::{RequestOptions, VantaClient};
use super::{add_tool, append_param, as_is, paged_schema, render_response, resource_url, Page};
use crate::error::Result;
use crate::mcp::{CallToolResult, ToolDefinition, ToolRegistry};

pub(super) fn register(registry: &mut ToolRegistry, client: &Arc<VantaClient>) {
    add_tool(
        registry,
        client,
        ToolDefinition::new(
            "get_controls",
            "List the security controls across all frameworks in your Vanta account with names, \
             descriptions, framework mappings and implementation status. Use it to find a control ID \
             for other tools, optionally narrowed to some frameworks with frameworkMatchesAny.",
            paged_schema(
                json!({
                    "frameworkMatchesAny": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Only controls belonging to any of these framework IDs, \
                            e.g. ['soc2', 'iso27001', 'hipaa']"
                    }
                }),
                &[],
                "controls",
            ),
        ),
        get_controls,
    );

    add_tool(
        registry,
        client,
        ToolDefinition::new(
            "get_control_tests",
            "Get the automated tests that validate one security control, with their current status \
             and any failing entities.",
            paged_schema(
                json!({
                    "controlId": {
                        "type": "string",
                        "description": "Control ID, e.g. 'access-control-1'"
                    }
                }),
                &["controlId"],
                "tests",
            ),
        ),
        get_control_tests,
    );
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetControlsArgs {
    #[serde(flatten)]
    page: Page,
    #[serde(default)]
    framework_matches_any: Vec<String>,
}

async fn get_controls(client: Arc<VantaClient>, args: GetControlsArgs) -> Result<CallToolResult> {
    let mut url = resource_url(&client, &["controls"])?;
    args.page.apply(&mut url);
    for framework in &args.framework_matches_any {
        append_param(&mut url, "frameworkMatchesAny", Some(framework));
    }

    let resp = client.request(url.clone(), RequestOptions::get()).await?;
    render_response(&url, resp, as_is).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ControlTestsArgs {
    control_id: String,
    #[serde(flatten)]
    page: Page,
}

async fn get_control_tests(client: Arc<VantaClient>, args: ControlTestsArgs) -> Result<CallToolResult> {
    let mut url = resource_url(&client, &["controls", &args.control_id, "tests"])?;
    args.page.apply(&mut url);

    let resp = client.request(url.clone(), RequestOptions::get()).await?;
    render_response(&url, resp, as_is).await
}
