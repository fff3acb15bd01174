//! CLI `status` command — JSON report on stdout, human summary on stderr.

use anyhow::Result;
use std::path::Path;

use simplemem_bridge::bridge::{check_status, StatusReport};
use simplemem_bridge::config::BridgeConfig;
use simplemem_bridge::engine::python::PythonEngineProvider;

/// Print the status report. Returns `ready`.
pub fn run(config: &BridgeConfig, db_path: &Path) -> Result<bool> {
    let provider = PythonEngineProvider::new(&config.engine);
    let report = check_status(&config.engine, &provider, db_path);

    super::print_json(&report)?;
    eprintln!("{}", summary(&report));

    Ok(report.ready)
}

fn summary(report: &StatusReport) -> String {
    if report.ready {
        return "\nSimpleMem is ready to use".to_string();
    }

    let mut out = String::from("\nSimpleMem has issues:");
    for error in &report.errors {
        out.push_str(&format!("\n  - {error}"));
    }
    if !report.installed {
        out.push_str("\n\nRun: simplemem install");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_issues_and_install_hint() {
        let report = StatusReport {
            errors: vec!["SimpleMem not installed at /tmp/SimpleMem".into()],
            ..StatusReport::default()
        };
        let text = summary(&report);
        assert!(text.contains("  - SimpleMem not installed at /tmp/SimpleMem"));
        assert!(text.contains("Run: simplemem install"));
    }

    #[test]
    fn summary_for_ready_report() {
        let report = StatusReport {
            installed: true,
            configured: true,
            import_successful: Some(true),
            ready: true,
            ..StatusReport::default()
        };
        assert!(summary(&report).contains("ready to use"));
    }
}
