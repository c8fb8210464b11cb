//! OAuth client credentials, loaded from a JSON file on demand

use secrecy::SecretString;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Client id and secret for the client-credentials grant.
pub struct Credentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Reads credentials from the file named by configuration.
///
/// Nothing is cached: every `load` re-reads the file, so a rotated secret
/// is picked up the next time a token is minted.
#[derive(Debug, Clone)]
pub struct CredentialLoader {
    path: Option<PathBuf>,
}

impl CredentialLoader {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub async fn load(&self) -> Result<Credentials> {
        let path = self.path.as_ref().ok_or_else(|| {
            Error::configuration(
                "VANTA_ENV_FILE is required (path to a JSON file with client_id and client_secret)",
            )
        })?;

        let data = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::configuration(format!(
                "Failed to load credentials from {}: {}",
                path.display(),
                e
            ))
        })?;

        // serde_json errors name only the position, never the offending text
        let parsed: Value = serde_json::from_str(&data).map_err(|e| {
            Error::configuration(format!(
                "Invalid JSON in credentials file {}: {}",
                path.display(),
                e
            ))
        })?;

        let Value::Object(mut fields) = parsed else {
            return Err(Error::configuration(format!(
                "Credentials file {} must contain a JSON object",
                path.display()
            )));
        };

        match (fields.remove("client_id"), fields.remove("client_secret")) {
            (Some(Value::String(client_id)), Some(Value::String(client_secret))) => {
                tracing::debug!(path = %path.display(), "Loaded OAuth client credentials");
                Ok(Credentials {
                    client_id,
                    client_secret: SecretString::from(client_secret),
                })
            }
            _ => Err(Error::configuration(format!(
                "client_id and client_secret are required as strings in {}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_valid_credentials() {
        let file = write_file(r#"{"client_id":"vci_123","client_secret":"vcs_hunter2"}"#);
        let loader = CredentialLoader::new(Some(file.path().to_path_buf()));

        let creds = loader.load().await.unwrap();
        assert_eq!(creds.client_id, "vci_123");
        assert_eq!(creds.client_secret.expose_secret(), "vcs_hunter2");
        assert!(!format!("{:?}", creds).contains("vcs_hunter2"));
    }

    #[tokio::test]
    async fn test_missing_path_is_configuration_error() {
        let err = CredentialLoader::new(None).load().await.unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("VANTA_ENV_FILE"));
    }

    #[tokio::test]
    async fn test_unreadable_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = CredentialLoader::new(Some(dir.path().join("absent.json")));

        let err = loader.load().await.unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("Failed to load credentials"));
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let file = write_file(r#"{"client_id":"vci_123","client_secret":"vcs_hunter2""#);
        let err = CredentialLoader::new(Some(file.path().to_path_buf()))
            .load()
            .await
            .unwrap_err();

        assert!(err.is_configuration());
        assert!(err.to_string().contains("Invalid JSON"));
        assert!(!err.to_string().contains("vcs_hunter2"));
    }

    #[tokio::test]
    async fn test_non_object_rejected() {
        let file = write_file(r#"["vci_123","vcs_hunter2"]"#);
        let err = CredentialLoader::new(Some(file.path().to_path_buf()))
            .load()
            .await
            .unwrap_err();

        assert!(err.to_string().contains("must contain a JSON object"));
        assert!(!err.to_string().contains("vcs_hunter2"));
    }

    #[tokio::test]
    async fn test_wrong_field_types_rejected() {
        let file = write_file(r#"{"client_id":42,"client_secret":"vcs_hunter2"}"#);
        let err = CredentialLoader::new(Some(file.path().to_path_buf()))
            .load()
            .await
            .unwrap_err();

        assert!(err.is_configuration());
        assert!(err.to_string().contains("client_id and client_secret are required"));
        assert!(!err.to_string().contains("vcs_hunter2"));

        let file = write_file(r#"{"client_id":"vci_123"}"#);
        let err = CredentialLoader::new(Some(file.path().to_path_buf()))
            .load()
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_reads_file_again_on_each_load() {
        let file = write_file(r#"{"client_id":"a","client_secret":"one"}"#);
        let loader = CredentialLoader::new(Some(file.path().to_path_buf()));
        assert_eq!(loader.load().await.unwrap().client_id, "a");

        std::fs::write(file.path(), r#"{"client_id":"b","client_secret":"two"}"#).unwrap();
        assert_eq!(loader.load().await.unwrap().client_id, "b");
    }
}
