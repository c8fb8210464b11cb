//! Groups and their members

use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::client::{RequestOptions, VantaClient};
use super::{add_tool, as_is, paged_schema, render_response, resource_url, Page};
use crate::error::Result;
use crate::mcp::{CallToolResult, ToolDefinition, ToolRegistry};
use crate::models::filter_people_response;

pub(super) fn register(registry: &mut ToolRegistry, client: &Arc<VantaClient>) {
    add_tool(
        registry,
        client,
        ToolDefinition::new(
            "get_groups",
            "List the groups in your Vanta account. Groups organize people into teams, departments \
             or other units for compliance and security management.",
            paged_schema(json!({}), &[], "groups"),
        ),
        get_groups,
    );

    add_tool(
        registry,
        client,
        ToolDefinition::new(
            "get_group_members",
            "List the people who belong to one group, useful for reviewing group composition and \
             access based on membership. Source details and per-task details are left out of the \
             response to keep it small.",
            paged_schema(
                json!({
                    "groupId": {"type": "string", "description": "ID of the group to list members of"}
                }),
                &["groupId"],
                "people",
            ),
        ),
        get_group_members,
    );
}

async fn get_groups(client: Arc<VantaClient>, page: Page) -> Result<CallToolResult> {
    let mut url = resource_url(&client, &["groups"])?;
    page.apply(&mut url);

    let resp = client.request(url.clone(), RequestOptions::get()).await?;
    render_response(&url, resp, as_is).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupMembersArgs {
    group_id: String,
    #[serde(flatten)]
    page: Page,
}

async fn get_group_members(client: Arc<VantaClient>, args: GroupMembersArgs) -> Result<CallToolResult> {
    let mut url = resource_url(&client, &["groups", &args.group_id, "people"])?;
    args.page.apply(&mut url);

    let resp = client.request(url.clone(), RequestOptions::get()).await?;
    render_response(&url, resp, filter_people_response).await
}
