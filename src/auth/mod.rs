//! Authentication module for the Vanta API
//!
//! Implements the OAuth2 client-credentials grant, caches the resulting
//! access token, and refreshes it either proactively (expiry minus a
//! safety margin) or on demand after the API answers 401.

pub mod clock;
pub mod credentials;
pub mod manager;
pub mod oauth;
pub mod tokens;

pub use clock::SystemClock;
pub use credentials::CredentialLoader;
pub use manager::TokenManager;
pub use oauth::ClientCredentialsSource;

/// Scope requested for every access token
pub const VANTA_API_SCOPE: &str = "vanta-api.all:read";

/// Identity endpoint, relative to the API base URL
pub const TOKEN_PATH: &str = "/oauth/token";
