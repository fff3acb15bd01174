//! CLI `install` command.

use anyhow::Result;

use simplemem_bridge::config::BridgeConfig;
use simplemem_bridge::install::install;

/// Install the engine, reading `OPENAI_API_KEY` from the environment.
pub async fn run(config: &BridgeConfig) -> Result<bool> {
    let api_key = std::env::var("OPENAI_API_KEY").ok();
    let response = install(config, api_key.as_deref()).await;

    super::print_json(&response)?;
    Ok(response.success)
}
