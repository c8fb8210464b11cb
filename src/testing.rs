//! Shared fixtures for tests that talk to a mock Vanta API

use std::io::Write;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::api::client::VantaClient;
use crate::auth::clock::ManualClock;
use crate::auth::{ClientCredentialsSource, CredentialLoader, TokenManager};

pub const TEST_CLIENT_SECRET: &str = "vcs_fixture-secret-9f8e7d";

/// Mount an identity endpoint handing out `token`. `times` limits how many
/// requests this mock answers so successive mounts can rotate tokens.
pub async fn mount_token(server: &MockServer, token: &str, expires_in: u64, times: Option<u64>) {
    let mock = Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": token,
            "expires_in": expires_in,
            "token_type": "Bearer",
        })));
    let mock = match times {
        Some(n) => mock.up_to_n_times(n),
        None => mock,
    };
    mock.mount(server).await;
}

/// A mock server plus a credentials file pointing the client at it.
pub struct TestEnv {
    pub server: MockServer,
    pub clock: ManualClock,
    credentials: tempfile::NamedTempFile,
}

impl TestEnv {
    pub async fn start() -> Self {
        let mut credentials = tempfile::NamedTempFile::new().unwrap();
        write!(
            credentials,
            r#"{{"client_id":"vci_fixture","client_secret":"{}"}}"#,
            TEST_CLIENT_SECRET
        )
        .unwrap();

        Self {
            server: MockServer::start().await,
            clock: ManualClock::new(1_700_000_000_000),
            credentials,
        }
    }

    pub fn base_url(&self) -> Url {
        Url::parse(&self.server.uri()).unwrap()
    }

    pub fn client(&self) -> Arc<VantaClient> {
        let http = reqwest::Client::new();
        let clock = Arc::new(self.clock.clone());
        let source = ClientCredentialsSource::new(
            http.clone(),
            &self.base_url(),
            CredentialLoader::new(Some(self.credentials.path().to_path_buf())),
            clock.clone(),
        );
        let tokens = Arc::new(TokenManager::new(Arc::new(source), clock));
        Arc::new(VantaClient::new(http, self.base_url(), tokens))
    }

    pub async fn token_requests(&self) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == "/oauth/token")
            .count()
    }
}
