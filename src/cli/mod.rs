pub mod install;
pub mod recall;
pub mod save;
pub mod status;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use simplemem_bridge::bridge::select_location;
use simplemem_bridge::config::BridgeConfig;

/// Resolve the database for this invocation from `--db-path` / `--project`.
pub fn resolve_db_path(
    config: &BridgeConfig,
    explicit: Option<&Path>,
    use_project: bool,
) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let location = select_location(&config.storage, explicit, use_project, &cwd);
    tracing::debug!(db = %location.path().display(), project = location.is_project(), "database resolved");
    Ok(location.into_path())
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize response")?;
    println!("{json}");
    Ok(())
}

/// Report a failure that happened outside any operation (config, cwd, ...).
pub fn print_failure(error: &anyhow::Error) {
    let body = serde_json::json!({
        "success": false,
        "error": format!("{error:#}"),
    });
    println!("{body:#}");
}
