//! Error taxonomy for authentication and outbound API calls

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised by the credential loader, the token lifecycle and the
/// authenticated request executor.
///
/// None of the variants ever carry the client secret. `AuthRequest` keeps
/// the identity endpoint's response body for diagnostics; that body is
/// produced by the server and does not echo the submitted credentials.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid credentials source, settings file or region.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The identity endpoint rejected the grant, could not be reached, or
    /// answered with a body that is not a token response.
    #[error("OAuth token request failed: {}", describe_auth_failure(.status, .body))]
    AuthRequest { status: Option<u16>, body: String },

    /// A tool argument cannot be turned into a request.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The downstream API could not be reached.
    #[error("upstream request failed: {0}")]
    Upstream(String),
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Transport-level failure on the identity hop (timeout, connect, decode).
    pub fn auth_transport(err: &reqwest::Error) -> Self {
        Self::AuthRequest {
            status: None,
            body: transport_message(err),
        }
    }

    /// Transport-level failure on the downstream hop.
    pub fn upstream(err: &reqwest::Error) -> Self {
        Self::Upstream(transport_message(err))
    }

    #[cfg(test)]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

fn describe_auth_failure(status: &Option<u16>, body: &str) -> String {
    match status {
        Some(code) => format!("HTTP {} - {}", code, body),
        None => body.to_string(),
    }
}

fn transport_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    }
}
