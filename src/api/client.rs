//! Authenticated HTTP client for the Vanta API
//!
//! Wraps reqwest::Client with bearer token injection and a single
//! refresh-and-retry when the API answers 401.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Method, Response, StatusCode};
use std::sync::Arc;
use url::Url;

use crate::auth::TokenManager;
use crate::config::join_path;
use crate::error::{Error, Result};

/// Marks every downstream call as coming from the MCP adapter.
pub const MCP_MARKER_HEADER: &str = "x-vanta-is-mcp";

/// Request payload. Kept as plain data so the retry can rebuild it.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    /// A single file part
    Multipart {
        field: String,
        file_name: String,
        bytes: Vec<u8>,
    },
}

/// Everything needed to (re)issue a request except the bearer token.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    /// Caller headers; these take precedence over the defaults
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post_json(body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(RequestBody::Json(body)),
            ..Default::default()
        }
    }

    pub fn post_file(field: &str, file_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            method: Method::POST,
            body: Some(RequestBody::Multipart {
                field: field.to_string(),
                file_name: file_name.to_string(),
                bytes,
            }),
            ..Default::default()
        }
    }
}

/// Client shared by every tool handler.
pub struct VantaClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<TokenManager>,
}

impl VantaClient {
    pub fn new(http: reqwest::Client, base_url: Url, tokens: Arc<TokenManager>) -> Self {
        Self {
            http,
            base_url,
            tokens,
        }
    }

    /// Absolute URL for an API path such as `/v1/tests`.
    pub fn endpoint(&self, path: &str) -> Url {
        join_path(&self.base_url, path)
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Issue `options` against `url` with the current bearer token.
    ///
    /// A 401 forces one token refresh and one resend; whatever the resend
    /// returns is handed back, including another 401. Other statuses are
    /// never retried and non-2xx responses are not turned into errors here.
    pub async fn request(&self, url: Url, options: RequestOptions) -> Result<Response> {
        let token = self.tokens.get_valid_token().await?;
        let resp = self.send_once(&url, &options, &token).await?;

        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        tracing::info!("401 Unauthorized for {}, refreshing token and retrying once", url);
        drop(resp);

        let token = self.tokens.refresh_token().await?;
        let retry = self.send_once(&url, &options, &token).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!("401 Unauthorized for {} persisted after token refresh", url);
        }
        Ok(retry)
    }

    async fn send_once(&self, url: &Url, options: &RequestOptions, token: &str) -> Result<Response> {
        tracing::debug!("Vanta {} {}", options.method, url);

        let mut builder = self
            .http
            .request(options.method.clone(), url.clone())
            .headers(merge_headers(token, &options.headers)?);

        builder = match &options.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Multipart {
                field,
                file_name,
                bytes,
            }) => {
                let part = reqwest::multipart::Part::bytes(bytes.clone()).file_name(file_name.clone());
                builder.multipart(reqwest::multipart::Form::new().part(field.clone(), part))
            }
            None => builder,
        };

        builder.send().await.map_err(|e| Error::upstream(&e))
    }
}

/// Default auth headers with the caller's headers layered on top.
fn merge_headers(token: &str, caller: &HeaderMap) -> Result<HeaderMap> {
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
        Error::AuthRequest {
            status: None,
            body: "access token contains characters not allowed in a header".to_string(),
        }
    })?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(
        HeaderName::from_static(MCP_MARKER_HEADER),
        HeaderValue::from_static("true"),
    );

    for (name, value) in caller {
        headers.insert(name.clone(), value.clone());
    }
    Ok(headers)
}
