use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::{info, LevelFilter};

use propimg::{config, Config, Credentials};

/// Download satellite image crops around property coordinates
#[derive(Parser, Debug)]
#[command(name = "propimg", version)]
struct Cli {
    /// CSV file with id, lat and long columns
    #[arg(long, default_value = config::DEFAULT_DATA_PATH)]
    data: PathBuf,
    /// Directory to store images in, one subdirectory per property id
    #[arg(short, long, default_value = config::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,
    /// Actually call the imagery provider (uses processing credits)
    #[arg(long, action)]
    download: bool,
    #[arg(long, env = "SH_CLIENT_ID", hide_env_values = true)]
    client_id: Option<String>,
    #[arg(long, env = "SH_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,
    #[arg(long, env = "SH_BASE_URL", default_value = config::DEFAULT_BASE_URL)]
    base_url: String,
    #[arg(long, env = "SH_AUTH_URL", default_value = config::DEFAULT_AUTH_URL)]
    auth_url: String,
    #[arg(short, long, action)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        let credentials = match (self.client_id, self.client_secret) {
            (Some(client_id), Some(client_secret)) => Some(Credentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };
        Config {
            download: self.download,
            data_path: self.data,
            output_dir: self.output_dir,
            credentials,
            base_url: self.base_url,
            auth_url: self.auth_url,
        }
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let mut logger = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    );
    if args.verbose {
        logger.filter_module("propimg", LevelFilter::Debug);
    }
    logger.format_timestamp_secs().init();

    let config = args.into_config();
    let summary = propimg::run(&config)?;
    info!(
        "Done: {} saved, {} failed, {} skipped",
        summary.saved(),
        summary.failed(),
        summary.skipped()
    );
    Ok(())
}
