//! First-time setup of the external engine.
//!
//! Clones the SimpleMem repository into the configured root, installs its
//! Python requirements, renders `config.py` from the shipped template, and
//! creates the global database directory. Re-running against a complete
//! installation is a no-op that still reports success.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

use crate::config::BridgeConfig;
use crate::engine::{API_KEY_PLACEHOLDER, API_KEY_UNSET};

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Git clone failed: {0}")]
    Clone(String),

    #[error("Pip install failed: {0}")]
    Deps(String),

    #[error("Installation timed out")]
    TimedOut,

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl InstallError {
    fn io(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> Self {
        let context = context.into();
        move |source| Self::Io { context, source }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InstallResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_installed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_created: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Install the engine. `api_key` is the caller's `OPENAI_API_KEY`, if any.
pub async fn install(config: &BridgeConfig, api_key: Option<&str>) -> InstallResponse {
    match run_install(config, api_key).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "installation failed");
            InstallResponse {
                success: false,
                error: Some(e.to_string()),
                ..InstallResponse::default()
            }
        }
    }
}

async fn run_install(
    config: &BridgeConfig,
    api_key: Option<&str>,
) -> Result<InstallResponse, InstallError> {
    let engine = &config.engine;
    let root = engine.resolved_root();

    if engine.is_installed() {
        tracing::info!(root = %root.display(), "engine already installed");
        return Ok(InstallResponse {
            success: true,
            message: Some("SimpleMem already installed".into()),
            path: Some(root.display().to_string()),
            already_installed: Some(true),
            ..InstallResponse::default()
        });
    }

    let install = &config.install;
    let pb = spinner();

    pb.set_message("Cloning SimpleMem repository...");
    tracing::info!(url = %install.repo_url, root = %root.display(), "cloning engine");
    let root_arg = root.to_string_lossy().into_owned();
    let output = run_step(
        &install.git,
        &["clone", install.repo_url.as_str(), root_arg.as_str()],
        install.clone_timeout_secs,
    )
    .await
    .inspect_err(|_| pb.finish_and_clear())?;
    if !output.status.success() {
        pb.finish_and_clear();
        return Err(InstallError::Clone(stderr_of(&output)));
    }

    pb.set_message("Installing dependencies...");
    let requirements = root.join("requirements.txt").to_string_lossy().into_owned();
    let mut pip_args = vec!["install", "-r", requirements.as_str()];
    pip_args.extend(install.pip_args.iter().map(String::as_str));
    tracing::info!(pip = %install.pip, "installing engine requirements");
    let output = run_step(&install.pip, &pip_args, install.deps_timeout_secs)
        .await
        .inspect_err(|_| pb.finish_and_clear())?;
    if !output.status.success() {
        pb.finish_and_clear();
        return Err(InstallError::Deps(stderr_of(&output)));
    }

    let key = api_key.filter(|k| !k.is_empty() && *k != API_KEY_PLACEHOLDER);

    let config_file = engine.config_file_path();
    let template = engine.config_template_path();
    if template.is_file() && !config_file.exists() {
        pb.set_message("Creating default config...");
        write_engine_config(&template, &config_file, key)?;
        tracing::info!(path = %config_file.display(), "engine config written");
    }

    let db_dir = config.storage.resolved_db_path();
    std::fs::create_dir_all(&db_dir).map_err(InstallError::io(format!(
        "failed to create database directory {}",
        db_dir.display()
    )))?;

    pb.finish_and_clear();

    let note = if key.is_some() {
        "Using OPENAI_API_KEY from environment".to_string()
    } else {
        format!("Remember to set OPENAI_API_KEY in {}", engine.config_file)
    };

    Ok(InstallResponse {
        success: true,
        message: Some("SimpleMem installed successfully".into()),
        path: Some(root.display().to_string()),
        already_installed: Some(false),
        db_path: Some(db_dir.display().to_string()),
        config_created: Some(config_file.exists()),
        note: Some(note),
        error: None,
    })
}

/// Fill the template's unset key assignment with `api_key`; leave it untouched otherwise.
pub fn render_engine_config(template: &str, api_key: Option<&str>) -> String {
    match api_key {
        Some(key) => template.replace(API_KEY_UNSET, &format!("OPENAI_API_KEY = \"{key}\"")),
        None => template.to_string(),
    }
}

fn write_engine_config(
    template: &Path,
    dest: &Path,
    api_key: Option<&str>,
) -> Result<(), InstallError> {
    let contents = std::fs::read_to_string(template).map_err(InstallError::io(format!(
        "failed to read {}",
        template.display()
    )))?;
    std::fs::write(dest, render_engine_config(&contents, api_key))
        .map_err(InstallError::io(format!("failed to write {}", dest.display())))
}

/// Run one external command with a deadline; the child is killed if it overruns.
async fn run_step(program: &str, args: &[&str], timeout_secs: u64) -> Result<Output, InstallError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match tokio::time::timeout(Duration::from_secs(timeout_secs), cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(InstallError::Spawn {
            program: program.to_string(),
            source,
        }),
        Err(_) => {
            tracing::warn!(program, timeout_secs, "install step timed out");
            Err(InstallError::TimedOut)
        }
    }
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
