//! Installation and storage health report.
//!
//! [`check_status`] always finishes: apart from the missing-installation gate,
//! every problem it finds is recorded in `errors` and reflected in the flags
//! rather than cutting the report short.

use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::EngineConfig;
use crate::engine::{EngineProvider, API_KEY_PLACEHOLDER, API_KEY_UNSET};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusReport {
    pub installed: bool,
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_configured: Option<bool>,
    pub database_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_size_mb: Option<f64>,
    pub database_path: String,
    pub simplemem_path: String,
    /// Diagnostics in the order they were found.
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_successful: Option<bool>,
    pub ready: bool,
}

/// Inspect installation, configuration, and the database at `db_path`.
pub fn check_status<P: EngineProvider>(
    engine: &EngineConfig,
    provider: &P,
    db_path: &Path,
) -> StatusReport {
    let root = engine.resolved_root();
    let mut report = StatusReport {
        database_path: db_path.display().to_string(),
        simplemem_path: root.display().to_string(),
        ..StatusReport::default()
    };

    if !engine.is_installed() {
        report
            .errors
            .push(format!("SimpleMem not installed at {}", root.display()));
        return report;
    }
    report.installed = true;

    let config_file = engine.config_file_path();
    if config_file.is_file() {
        report.configured = true;
        match std::fs::read_to_string(&config_file) {
            Ok(contents) => {
                let has_key = api_key_present(&contents);
                if !has_key {
                    report
                        .errors
                        .push(format!("API key not configured in {}", engine.config_file));
                }
                report.api_key_configured = Some(has_key);
            }
            Err(e) => report.errors.push(format!("Could not read config: {e}")),
        }
    } else {
        report
            .errors
            .push(format!("{} not found - run installation", engine.config_file));
    }

    if db_path.exists() {
        report.database_exists = true;
        match directory_size(db_path) {
            Ok(bytes) => report.database_size_mb = Some(bytes_to_mb(bytes)),
            Err(e) => report
                .errors
                .push(format!("Could not calculate database size: {e}")),
        }
    } else {
        report
            .errors
            .push("Database directory not found - will be created on first use".into());
    }

    match provider.check_import() {
        Ok(()) => report.import_successful = Some(true),
        Err(e) => {
            report.import_successful = Some(false);
            report.errors.push(format!("Cannot import SimpleMem: {e}"));
        }
    }

    report.ready =
        report.installed && report.configured && report.import_successful == Some(true);

    tracing::debug!(ready = report.ready, issues = report.errors.len(), "status checked");
    report
}

/// False when the config still holds the template placeholder or the unset assignment.
pub fn api_key_present(config_contents: &str) -> bool {
    !(config_contents.contains(API_KEY_PLACEHOLDER) || config_contents.contains(API_KEY_UNSET))
}

/// Total size in bytes of every file under the directory `path`.
///
/// A plain file at `path` counts as empty. Symlinked files are counted at their
/// target's size; symlinked directories are not descended into.
pub fn directory_size(path: &Path) -> Result<u64, walkdir::Error> {
    if !path.is_dir() {
        return Ok(0);
    }

    let mut total = 0;
    for entry in WalkDir::new(path).min_depth(1) {
        let entry = entry?;
        let file_type = entry.file_type();
        if file_type.is_file() {
            total += entry.metadata()?.len();
        } else if file_type.is_symlink() {
            if let Ok(target) = std::fs::metadata(entry.path()) {
                if target.is_file() {
                    total += target.len();
                }
            }
        }
    }
    Ok(total)
}

fn bytes_to_mb(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0
}
