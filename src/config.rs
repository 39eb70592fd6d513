use std::path::PathBuf;

use anyhow::{bail, Result};

pub const DEFAULT_DATA_PATH: &str = "data/train.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "images";
pub const DEFAULT_BASE_URL: &str = "https://services.sentinel-hub.com";
pub const DEFAULT_AUTH_URL: &str =
    "https://services.sentinel-hub.com/auth/realms/main/protocol/openid-connect/token";

/// OAuth client pair for the imagery provider.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// Settings for one run. Built once at startup, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// When false, no provider call is made at all.
    pub download: bool,
    pub data_path: PathBuf,
    pub output_dir: PathBuf,
    pub credentials: Option<Credentials>,
    pub base_url: String,
    pub auth_url: String,
}

impl Config {
    /// Credentials are required only when downloading is enabled.
    pub fn validate(&self) -> Result<()> {
        if !self.download {
            return Ok(());
        }
        match &self.credentials {
            Some(c) if !c.client_id.is_empty() && !c.client_secret.is_empty() => Ok(()),
            _ => bail!("Downloading enabled but provider client id/secret are missing"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            download: false,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            credentials: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
        }
    }
}
