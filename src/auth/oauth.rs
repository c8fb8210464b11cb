//! OAuth2 client-credentials exchange against the Vanta identity endpoint

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::error::Category;
use std::sync::Arc;
use url::Url;

use super::clock::Clock;
use super::credentials::CredentialLoader;
use super::tokens::StoredToken;
use super::{TOKEN_PATH, VANTA_API_SCOPE};
use crate::config::join_path;
use crate::error::{Error, Result};

/// Something that can mint a brand new access token.
///
/// Implementations always perform a full exchange; caching is the
/// responsibility of [`super::TokenManager`].
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<StoredToken>;
}

#[derive(Serialize)]
struct GrantRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'static str,
    scope: &'static str,
}

/// Successful response from `/oauth/token`
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(deserialize_with = "lifetime_secs")]
    expires_in: u64,
    token_type: String,
}

/// `expires_in` is any non-negative JSON number; fractions are truncated
/// to whole seconds.
fn lifetime_secs<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = serde_json::Number::deserialize(deserializer)?;
    n.as_u64()
        .or_else(|| {
            n.as_f64()
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(|secs| secs as u64)
        })
        .ok_or_else(|| serde::de::Error::custom("expires_in must be a non-negative number"))
}

/// Mints tokens with the client-credentials grant.
pub struct ClientCredentialsSource {
    http: reqwest::Client,
    token_url: Url,
    credentials: CredentialLoader,
    clock: Arc<dyn Clock>,
}

impl ClientCredentialsSource {
    pub fn new(
        http: reqwest::Client,
        base_url: &Url,
        credentials: CredentialLoader,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http,
            token_url: join_path(base_url, TOKEN_PATH),
            credentials,
            clock,
        }
    }
}

#[async_trait]
impl TokenSource for ClientCredentialsSource {
    async fn fetch_token(&self) -> Result<StoredToken> {
        let credentials = self.credentials.load().await?;

        tracing::debug!("Requesting OAuth token from {}", self.token_url);

        let grant = GrantRequest {
            client_id: &credentials.client_id,
            client_secret: credentials.client_secret.expose_secret(),
            grant_type: "client_credentials",
            scope: VANTA_API_SCOPE,
        };

        let resp = self
            .http
            .post(self.token_url.clone())
            .json(&grant)
            .send()
            .await
            .map_err(|e| Error::auth_transport(&e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "OAuth token request rejected");
            return Err(Error::AuthRequest {
                status: Some(status.as_u16()),
                body,
            });
        }

        let body = resp.text().await.map_err(|e| Error::auth_transport(&e))?;
        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::AuthRequest {
                status: Some(status.as_u16()),
                body: describe_parse_error(&e),
            })?;

        if parsed.access_token.is_empty() {
            return Err(Error::AuthRequest {
                status: Some(status.as_u16()),
                body: "token response carried an empty access_token".to_string(),
            });
        }

        let token = StoredToken::new(
            parsed.access_token,
            parsed.expires_in,
            self.clock.now_millis(),
        );
        tracing::info!(
            token_type = %parsed.token_type,
            expires_in = parsed.expires_in,
            "OAuth token acquired"
        );
        Ok(token)
    }
}

/// Describe a bad token response without quoting it; the body may hold a
/// usable bearer value.
fn describe_parse_error(err: &serde_json::Error) -> String {
    match err.classify() {
        Category::Data => format!(
            "malformed token response: expected access_token, expires_in and token_type (line {}, column {})",
            err.line(),
            err.column()
        ),
        _ => format!(
            "token response is not valid JSON (line {}, column {})",
            err.line(),
            err.column()
        ),
    }
}
