//! Gem Cascade line-protocol server (default binary).
//!
//! Reads JSON requests from stdin and writes responses and events to stdout.
//! Logs go to stderr, filtered by `RUST_LOG` (default `info`).

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gem_cascade::adapter::serve_stdio;
use gem_cascade::engine::{EngineConfig, GameEngine};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = EngineConfig::from_env();
    info!(?config, "starting gem-cascade");

    let engine = GameEngine::new(config);
    let result = serve_stdio(engine.clone()).await;
    engine.cleanup();
    result
}
