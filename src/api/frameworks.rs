//! Compliance frameworks and their control requirements

use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::client::{RequestOptions, VantaClient};
use super::{add_tool, as_is, paged_schema, render_response, resource_url, Page};
use crate::error::Result;
use crate::mcp::{CallToolResult, ToolDefinition, ToolRegistry};

pub(super) fn register(registry: &mut ToolRegistry, client: &Arc<VantaClient>) {
    add_tool(
        registry,
        client,
        ToolDefinition::new(
            "get_frameworks",
            "List the compliance frameworks in your Vanta account (SOC 2, ISO 27001, HIPAA, GDPR, \
             FedRAMP, PCI, etc.) with completion status and progress metrics for their controls, \
             documents and tests.",
            paged_schema(json!({}), &[], "frameworks"),
        ),
        get_frameworks,
    );

    add_tool(
        registry,
        client,
        ToolDefinition::new(
            "get_framework_controls",
            "Get the control requirements of one framework, such as 'soc2' or 'iso27001', with \
             descriptions and implementation guidance. Use get_frameworks first to find framework IDs.",
            paged_schema(
                json!({
                    "frameworkId": {"type": "string", "description": "Framework ID, e.g. soc2"}
                }),
                &["frameworkId"],
                "controls",
            ),
        ),
        get_framework_controls,
    );
}

async fn get_frameworks(client: Arc<VantaClient>, page: Page) -> Result<CallToolResult> {
    let mut url = resource_url(&client, &["frameworks"])?;
    page.apply(&mut url);

    let resp = client.request(url.clone(), RequestOptions::get()).await?;
    render_response(&url, resp, as_is).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrameworkControlsArgs {
    framework_id: String,
    #[serde(flatten)]
    page: Page,
}

async fn get_framework_controls(
    client: Arc<VantaClient>,
    args: FrameworkControlsArgs,
) -> Result<CallToolResult> {
    let mut url = resource_url(&client, &["frameworks", &args.framework_id, "controls"])?;
    args.page.apply(&mut url);

    let resp = client.request(url.clone(), RequestOptions::get()).await?;
    render_response(&url, resp, as_is).await
}
