use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use docport_core::api::PortalApi;
use docport_core::config::PortalSettings;
use docport_core::storage::TokenStore;
use docport_infrastructure::{ConfigService, DocportPaths, FileTokenStore, HttpPortalApi};
use tokio::sync::mpsc;

mod commands;
mod logging;
mod render;
mod repl;
mod view_loop;

#[derive(Parser, Debug)]
#[command(name = "docport")]
#[command(about = "docport - chat with your uploaded documents from the terminal", long_about = None)]
struct Cli {
    /// Base URL of the portal API (beats DOCPORT_API_BASE_URL and config.toml)
    #[arg(long)]
    api_base_url: Option<String>,

    /// Language questions are asked in, e.g. `en` or `fr`
    #[arg(long)]
    lang: Option<String>,

    /// Route to open at startup
    #[arg(long, default_value = "/")]
    route: String,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Keep config, token and logs under this directory instead of the
    /// platform defaults
    #[arg(long)]
    home: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = DocportPaths::new(cli.home.clone());

    let _log_guard = logging::init_tracing(&paths.logs_dir()?, &cli.log_level)?;
    tracing::info!("docport {} starting", env!("CARGO_PKG_VERSION"));

    let overrides = PortalSettings {
        api_base_url: cli.api_base_url,
        default_language: cli.lang,
        request_timeout_secs: None,
    };
    let config = ConfigService::new(&paths)?
        .load(overrides)
        .context("Failed to load configuration")?;

    let api: Arc<dyn PortalApi> = Arc::new(HttpPortalApi::new(config.clone())?);
    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&paths)?);

    let (tx, rx) = mpsc::channel(16);
    let repl = std::thread::spawn(move || repl::run(tx));

    view_loop::ViewLoop::new(api, store, config.default_language.clone())
        .run(&cli.route, rx)
        .await;

    match repl.join() {
        Ok(result) => result.context("Terminal error")?,
        Err(_) => anyhow::bail!("REPL thread panicked"),
    }

    tracing::info!("docport stopped");
    Ok(())
}
