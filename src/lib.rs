use anyhow::{Context, Result};
use log::info;

pub use bbox::{BoundingBox, ImageSize};
pub use config::{Config, Credentials};
pub use driver::{Driver, FetchOutcome, RunSummary};
pub use error::FetchError;
pub use property::PropertyRecord;
pub use provider::{ImageRequester, SentinelHubClient};
pub use store::ImageStore;

pub mod bbox;
pub mod config;
pub mod driver;
pub mod error;
pub mod property;
pub mod provider;
pub mod store;

/// Loads the property table and downloads an image for every record.
///
/// Only startup problems (unreadable input, missing credentials) are
/// returned as errors; per-record failures end up in the summary.
pub fn run(config: &Config) -> Result<RunSummary> {
    config.validate()?;

    let records = property::load_properties(&config.data_path)?;
    info!(
        "Loaded {} rows from {}",
        records.len(),
        config.data_path.to_string_lossy()
    );

    let credentials = match (&config.credentials, config.download) {
        (Some(credentials), true) => credentials.clone(),
        _ => return Ok(driver::skip_all(&records)),
    };

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", config.output_dir))?;

    let client = SentinelHubClient::new(credentials, &config.base_url, &config.auth_url);
    let store = ImageStore::new(&config.output_dir);
    Ok(Driver::new(config, client, store).run(&records))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use tempfile::tempdir;

    #[test]
    fn run_disabled_skips_everything() {
        let temp_dir = tempdir().unwrap();
        let data_path = temp_dir.path().join("train.csv");
        fs::write(&data_path, "id,lat,long\n1,40.0,-74.0\n2,41.0,-73.0\n").unwrap();
        let config = Config {
            data_path,
            output_dir: temp_dir.path().join("images"),
            ..Config::default()
        };

        let summary = run(&config).unwrap();

        assert_eq!(summary.skipped(), 2);
        assert!(!temp_dir.path().join("images").exists());
    }

    #[test]
    fn run_missing_input_fails() {
        let temp_dir = tempdir().unwrap();
        let config = Config {
            data_path: temp_dir.path().join("missing.csv"),
            ..Config::default()
        };

        assert!(run(&config).is_err());
    }

    #[test]
    fn run_enabled_without_credentials_fails() {
        let temp_dir = tempdir().unwrap();
        let data_path = temp_dir.path().join("train.csv");
        fs::write(&data_path, "id,lat,long\n1,40.0,-74.0\n").unwrap();
        let config = Config {
            download: true,
            data_path,
            ..Config::default()
        };

        assert!(run(&config).is_err());
    }
}
