//! CLI `recall` command.

use anyhow::Result;
use std::path::Path;

use simplemem_bridge::bridge::recall::recall;
use simplemem_bridge::config::BridgeConfig;
use simplemem_bridge::engine::python::PythonEngineProvider;

/// Recall and print either the JSON response or, with `text_only`, just the context.
pub fn run(
    config: &BridgeConfig,
    db_path: &Path,
    query: &str,
    top_k: usize,
    text_only: bool,
) -> Result<bool> {
    let provider = PythonEngineProvider::new(&config.engine);
    let response = recall(&provider, db_path, query, top_k);

    if text_only {
        println!("{}", response.context);
    } else {
        super::print_json(&response)?;
    }

    Ok(response.success)
}
