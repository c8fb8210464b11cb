//! Evidence document uploads

use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::client::{RequestOptions, VantaClient};
use super::{add_tool, as_is, object_schema, render_response, resource_url};
use crate::error::Result;
use crate::mcp::{CallToolResult, ToolDefinition, ToolRegistry};

/// Multipart field the upload endpoint reads the file from.
const FILE_FIELD: &str = "file";

pub(super) fn register(registry: &mut ToolRegistry, client: &Arc<VantaClient>) {
    add_tool(
        registry,
        client,
        ToolDefinition::new(
            "upload_document",
            "UPLOAD a file to Vanta as compliance evidence: policies, procedures, incident reports \
             and similar documents. Requires the target documentId and the path of a local file to \
             send. This uploads files; it does not view or retrieve existing documents.",
            object_schema(
                json!({
                    "documentId": {
                        "type": "string",
                        "description": "Document ID in Vanta to upload to, e.g. 'incident-response-policy'"
                    },
                    "filePath": {
                        "type": "string",
                        "description": "Path of the file to upload, readable by this server"
                    }
                }),
                &["documentId", "filePath"],
            ),
        ),
        upload_document,
    );
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadArgs {
    document_id: String,
    file_path: PathBuf,
}

async fn upload_document(client: Arc<VantaClient>, args: UploadArgs) -> Result<CallToolResult> {
    let bytes = match tokio::fs::read(&args.file_path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return Ok(CallToolResult::error(format!(
                "Failed to read {}: {}",
                args.file_path.display(),
                e
            )))
        }
    };

    let url = resource_url(&client, &["documents", &args.document_id, "upload"])?;
    let file_name = upload_name(&args.file_path);
    tracing::info!(document = %args.document_id, "Uploading {} ({} bytes)", file_name, bytes.len());

    let options = RequestOptions::post_file(FILE_FIELD, &file_name, bytes);
    let resp = client.request(url.clone(), options).await?;
    render_response(&url, resp, as_is).await
}

fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}
