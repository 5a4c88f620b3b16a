//! Headless scenario runner.
//!
//! Loads content, runs a scripted encounter through the async runtime and
//! prints a JSON summary (final snapshot, casts, event counts).
//!
//! ```bash
//! RUST_LOG=debug GAS_SIM_DURATION=10 cargo run -p gas-sim
//! ```

mod config;
mod logging;
mod scenario;

use anyhow::{Context, Result};
use gas_content::ContentFactory;

use crate::config::SimConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = SimConfig::from_env();
    let _log_guard = logging::setup_logging(&config)?;

    let factory = match &config.data_dir {
        Some(dir) => ContentFactory::new(dir.clone()),
        None => ContentFactory::bundled(),
    };
    tracing::info!(data_dir = %factory.data_dir().display(), "loading content");
    let content = factory.load()?;

    let summary = scenario::run(&config, &content).await?;
    let json = serde_json::to_string_pretty(&summary)?;

    match &config.summary_path {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write summary {}", path.display()))?;
            tracing::info!("Summary written to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
