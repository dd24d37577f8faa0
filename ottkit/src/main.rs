use ottkit_client::{AssetType, HttpExecutor, PlaybackContextType};
use ottkit_core::{
    logging, Config, MediaProvider, MediaProviderConfig, PhoenixMediaProvider,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "ottkit")]
#[command(about = "Resolve an OTT asset into player-ready sources", long_about = None)]
struct Args {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, env = "OTTKIT_CONFIG")]
    config: Option<String>,

    /// Backend API root, e.g. https://ott.example.com/api_v3
    #[arg(long, env = "OTTKIT_BASE_URL")]
    base_url: Option<String>,

    /// Partner id used for the anonymous login
    #[arg(long, env = "OTTKIT_PARTNER_ID")]
    partner_id: Option<i64>,

    /// Existing session token; skips the anonymous login
    #[arg(long, env = "OTTKIT_KS")]
    ks: Option<String>,

    /// Device id sent with the anonymous login
    #[arg(long)]
    udid: Option<String>,

    /// Asset to resolve
    #[arg(long)]
    asset_id: Option<String>,

    /// Asset type (media, epg)
    #[arg(long)]
    asset_type: Option<AssetType>,

    /// Playback context (trailer, catchup, start_over, playback)
    #[arg(long)]
    context_type: Option<PlaybackContextType>,

    /// Preferred source type, in order (repeatable)
    #[arg(long = "format")]
    formats: Vec<String>,

    /// Preferred file id, in order (repeatable); ignored when --format is given
    #[arg(long = "file-id")]
    file_ids: Vec<String>,

    /// Delivery protocol requested from the backend
    #[arg(long)]
    protocol: Option<String>,

    /// Referrer passed to the backend
    #[arg(long)]
    referrer: Option<String>,
}

impl Args {
    /// Overlay command-line values on the configured defaults
    fn media_config(self, defaults: MediaProviderConfig) -> MediaProviderConfig {
        MediaProviderConfig {
            base_url: self.base_url.or(defaults.base_url),
            partner_id: self.partner_id.or(defaults.partner_id),
            ks: self.ks.or(defaults.ks),
            udid: self.udid.or(defaults.udid),
            asset_id: self.asset_id.or(defaults.asset_id),
            asset_type: self.asset_type.unwrap_or(defaults.asset_type),
            context_type: self.context_type.unwrap_or(defaults.context_type),
            formats: non_empty(self.formats).or(defaults.formats),
            file_ids: non_empty(self.file_ids).or(defaults.file_ids),
            network_protocol: self.protocol.or(defaults.network_protocol),
            referrer: self.referrer.or(defaults.referrer),
        }
    }
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    (!values.is_empty()).then_some(values)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    logging::init_logging(&config.logging)?;

    let problems = config.validate();
    if !problems.is_empty() {
        for problem in &problems {
            error!("Invalid configuration: {problem}");
        }
        bail!("configuration has {} problem(s)", problems.len());
    }

    let executor = HttpExecutor::with_timeouts(config.http.connect_timeout(), config.http.timeout())
        .context("Failed to build HTTP client")?;
    let provider =
        PhoenixMediaProvider::new(Arc::new(executor)).with_policy(config.support.clone());

    let media = args.media_config(config.media);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted");
            on_signal.cancel();
        }
    });

    match provider.load_media(&media, &cancel).await {
        Ok(description) => {
            println!("{}", serde_json::to_string_pretty(&description)?);
            Ok(())
        }
        Err(e) => {
            error!(code = ?e.code(), "Media resolution failed: {e}");
            Err(e.into())
        }
    }
}
