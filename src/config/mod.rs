//! Configuration: settings file, environment and region selection

use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::error::Error;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Vanta deployment region; selects the API base URL for the whole process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Region {
    #[default]
    Us,
    Eu,
    Aus,
}

impl Region {
    pub fn base_url(self) -> &'static str {
        match self {
            Region::Us => "https://api.vanta.com",
            Region::Eu => "https://api.eu.vanta.com",
            Region::Aus => "https://api.aus.vanta.com",
        }
    }

    /// Resolve an optional region value; unset or empty means US.
    pub fn resolve(value: Option<&str>) -> Result<Self, Error> {
        match value {
            None | Some("") => Ok(Region::Us),
            Some(v) => v.parse(),
        }
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "us" => Ok(Region::Us),
            "eu" => Ok(Region::Eu),
            "aus" => Ok(Region::Aus),
            other => Err(Error::configuration(format!(
                "Invalid region: {}. Use: us, eu, aus",
                other
            ))),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Region::Us => "us",
            Region::Eu => "eu",
            Region::Aus => "aus",
        })
    }
}

/// Optional on-disk settings (`config.toml` in the platform config dir).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the JSON credentials file
    pub env_file: Option<PathBuf>,
    /// `us`, `eu` or `aus`
    pub region: Option<String>,
    /// Overrides the region's base URL (staging, local testing)
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Settings {
    /// Get config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "vanta", "vanta-mcp").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Load settings from the platform config directory. A missing file,
    /// or no config directory at all, yields empty settings.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_in(Self::config_dir())
    }

    fn load_in(config_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        match config_dir {
            Some(dir) => Self::load_from(&dir.join("config.toml")),
            None => {
                tracing::debug!("No config directory available, skipping settings file");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Invalid settings file {}: {}", path.display(), e)))?;
        Ok(settings)
    }

    /// Layer `overrides` on top of `self`; any value set in `overrides` wins.
    pub fn merge(self, overrides: Settings) -> Settings {
        Settings {
            env_file: overrides.env_file.or(self.env_file),
            region: overrides.region.or(self.region),
            base_url: overrides.base_url.or(self.base_url),
            request_timeout_secs: overrides.request_timeout_secs.or(self.request_timeout_secs),
        }
    }

    /// Validate and turn settings into the configuration the process runs with.
    pub fn resolve(self) -> Result<RuntimeConfig, Error> {
        let region = Region::resolve(self.region.as_deref())?;

        let raw_base = self
            .base_url
            .as_deref()
            .unwrap_or_else(|| region.base_url());
        let base_url = Url::parse(raw_base)
            .map_err(|e| Error::configuration(format!("Invalid base URL {}: {}", raw_base, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::configuration(format!(
                "Base URL {} cannot carry a path",
                raw_base
            )));
        }

        let timeout_secs = self
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::configuration("request timeout must be at least 1 second"));
        }

        Ok(RuntimeConfig {
            credentials_path: self.env_file,
            region,
            base_url,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Fully resolved configuration, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// `None` is reported by the credential loader the first time a token
    /// must be minted.
    pub credentials_path: Option<PathBuf>,
    pub region: Region,
    pub base_url: Url,
    pub request_timeout: Duration,
}

impl RuntimeConfig {
    /// Join an API path (e.g. `/v1/tests`) onto the base URL.
    pub fn endpoint(&self, path: &str) -> Url {
        join_path(&self.base_url, path)
    }
}

/// Append `path` to the base URL's path, keeping any prefix the base carries.
pub fn join_path(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let joined = format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);
    url.set_query(None);
    url
}
