use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tag_batch::utils::parse_id_list;
use tag_batch::{ApiEnvironment, BatchDigest, FetchConfig, TagBatchAggregator, UserAction};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tag-batch", about = "Fetch and rank image tags for a batch of uploads")]
struct Cli {
    /// Use the development API instead of production
    #[arg(long, global = true)]
    dev: bool,

    /// Override the API base URL entirely
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Attempts per identifier before giving up
    #[arg(long, global = true)]
    max_attempts: Option<u32>,

    /// Delay between polling attempts in milliseconds
    #[arg(long, global = true)]
    retry_delay_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Show every tag above 50% instead of the top 10
    #[arg(long, global = true)]
    show_more: bool,

    /// Print the batch state as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up tags for identifiers returned by a previous upload
    Tags {
        /// Identifiers, separately or comma-separated
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Upload up to 5 images and look up their tags
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

impl Cli {
    fn fetch_config(&self) -> FetchConfig {
        let mut config = if self.dev {
            FetchConfig::for_environment(ApiEnvironment::Development)
        } else {
            FetchConfig::from_env()
        };
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = max_attempts;
        }
        if let Some(retry_delay_ms) = self.retry_delay_ms {
            config.retry_delay_ms = retry_delay_ms;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_seconds = timeout;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.fetch_config();
    info!("Using classification service at {}", config.base_url);

    let aggregator = TagBatchAggregator::new(config).context("Failed to build HTTP client")?;

    let result = match &cli.command {
        Command::Tags { ids } => aggregator.run_batch(parse_id_list(ids.as_slice())).await,
        Command::Upload { files } => aggregator.upload_and_run(files.as_slice()).await,
    };
    if let Err(e) = &result {
        error!("Batch failed: {}", e);
    }
    result?;

    if cli.show_more {
        aggregator.store().dispatch(UserAction::EnableShowMore).await;
    }
    let snapshot = aggregator.store().snapshot().await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot).context("Failed to encode batch state")?);
    } else {
        print!("{}", BatchDigest::render(&snapshot.state));
    }

    Ok(())
}
