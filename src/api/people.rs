//! People in the Vanta account

use serde_json::json;
use std::sync::Arc;

use super::client::{RequestOptions, VantaClient};
use super::{add_tool, paged_schema, render_response, resource_url, Page};
use crate::error::Result;
use crate::mcp::{CallToolResult, ToolDefinition, ToolRegistry};
use crate::models::filter_people_response;

pub(super) fn register(registry: &mut ToolRegistry, client: &Arc<VantaClient>) {
    add_tool(
        registry,
        client,
        ToolDefinition::new(
            "get_people",
            "List the people in your Vanta account: employees, contractors and other personnel with \
             access to your organization's systems and data. Source details and per-task details are \
             left out of the response to keep it small.",
            paged_schema(json!({}), &[], "people"),
        ),
        get_people,
    );
}

async fn get_people(client: Arc<VantaClient>, page: Page) -> Result<CallToolResult> {
    let mut url = resource_url(&client, &["people"])?;
    page.apply(&mut url);

    let resp = client.request(url.clone(), RequestOptions::get()).await?;
    render_response(&url, resp, filter_people_response).await
}
