use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use streampick::{config::Config, logging, render, resolve_with_retry, OutputFormat};
use streampick_resolver::{MetadataClient, ResolveError, SelectionMode, StreamResolver};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "streampick")]
#[command(about = "Resolve the best playable stream for a video", long_about = None)]
struct Args {
    /// Video URL or bare 11-character identifier
    source: String,

    /// Configuration file (toml, yaml or json)
    #[arg(short, long, env = "STREAMPICK_CONFIG_FILE")]
    config: Option<String>,

    /// Metadata service host
    #[arg(long)]
    host: Option<String>,

    /// Metadata service port
    #[arg(long)]
    port: Option<u16>,

    /// Selection mode (partitioned, single)
    #[arg(long)]
    mode: Option<SelectionMode>,

    /// Retries for transient fetch failures
    #[arg(long)]
    retries: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl Args {
    fn apply_to(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.endpoint.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.endpoint.port = port;
        }
        if let Some(mode) = self.mode {
            config.selection.mode = mode;
        }
        if let Some(retries) = self.retries {
            config.retry.max_retries = retries;
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            match err.downcast_ref::<ResolveError>() {
                Some(ResolveError::Input(_)) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_to(&mut config);

    logging::init_logging(&config.logging)?;

    let client = MetadataClient::with_options(&config.endpoint.client_options())
        .context("Failed to build HTTP client")?;
    let resolver = StreamResolver::new(Arc::new(client))
        .with_endpoint(config.endpoint.endpoint())
        .with_mode(config.selection.mode);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    info!(
        source = %args.source,
        endpoint = %resolver.endpoint().base_url(),
        mode = %resolver.mode(),
        "Resolving stream"
    );

    let resolution = resolve_with_retry(&resolver, &args.source, &config.retry, &cancel)
        .await
        .with_context(|| format!("Failed to resolve {}", args.source))?;

    info!(
        video_id = %resolution.video_id,
        mime_type = %resolution.stream.mime_type,
        split_audio = resolution.stream.audio_url.is_some(),
        warnings = resolution.warnings.len(),
        "Resolved stream"
    );

    print!("{}", render(&resolution, args.format)?);
    Ok(())
}
