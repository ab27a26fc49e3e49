use anyhow::Context as _;
use tracing::info;
use tracing_subscriber::EnvFilter;

use versus::EngineBuilder;
use versus::config::GameConfig;

fn main() -> anyhow::Result<()> {
    let debug = std::env::args().any(|arg| arg == "--debug");
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let path = GameConfig::default_path();
    let config = GameConfig::load(&path);
    info!(config = %path.display(), assets = %config.asset_dir.display(), "starting");

    EngineBuilder::default().with_config(config).run().context("game exited with an error")
}
