use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct BridgeConfig {
    pub engine: EngineConfig,
    pub storage: StorageConfig,
    pub install: InstallConfig,
    pub log: LogConfig,
}

/// Where the external SimpleMem checkout lives and how to reach it.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub root: String,
    pub entry_point: String,
    pub config_file: String,
    pub config_template: String,
    pub python: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// The global store, used whenever no project scoping is requested.
    pub db_path: String,
    pub projects_root: String,
    pub project_prefix: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InstallConfig {
    pub repo_url: String,
    pub git: String,
    pub pip: String,
    pub pip_args: Vec<String>,
    pub clone_timeout_secs: u64,
    pub deps_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root: "/tmp/SimpleMem".into(),
            entry_point: "main.py".into(),
            config_file: "config.py".into(),
            config_template: "config.py.example".into(),
            python: "python3".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "/tmp/simplemem_db".into(),
            projects_root: "~/.claude/projects".into(),
            project_prefix: "simplemem-".into(),
        }
    }
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            repo_url: "https://github.com/aiming-lab/SimpleMem.git".into(),
            git: "git".into(),
            pip: "pip".into(),
            pip_args: vec!["--break-system-packages".into()],
            clone_timeout_secs: 60,
            deps_timeout_secs: 300,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
        }
    }
}

impl EngineConfig {
    pub fn resolved_root(&self) -> PathBuf {
        expand_tilde(&self.root)
    }

    /// The file whose presence marks a usable installation.
    pub fn entry_point_path(&self) -> PathBuf {
        self.resolved_root().join(&self.entry_point)
    }

    pub fn config_file_path(&self) -> PathBuf {
        self.resolved_root().join(&self.config_file)
    }

    pub fn config_template_path(&self) -> PathBuf {
        self.resolved_root().join(&self.config_template)
    }

    /// Installed means the root exists and carries the entry-point file.
    pub fn is_installed(&self) -> bool {
        self.resolved_root().is_dir() && self.entry_point_path().is_file()
    }
}

impl StorageConfig {
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.db_path)
    }

    pub fn resolved_projects_root(&self) -> PathBuf {
        expand_tilde(&self.projects_root)
    }
}

/// Returns `~/.simplemem-bridge/`
pub fn default_bridge_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".simplemem-bridge")
}

/// Returns the config file path: `$SIMPLEMEM_BRIDGE_CONFIG` or `~/.simplemem-bridge/config.toml`
pub fn default_config_path() -> PathBuf {
    match std::env::var("SIMPLEMEM_BRIDGE_CONFIG") {
        Ok(path) if !path.is_empty() => expand_tilde(&path),
        _ => default_bridge_dir().join("config.toml"),
    }
}

impl BridgeConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            BridgeConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (SIMPLEMEM_ROOT, SIMPLEMEM_DB, SIMPLEMEM_PROJECTS_ROOT, SIMPLEMEM_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SIMPLEMEM_ROOT") {
            self.engine.root = val;
        }
        if let Ok(val) = std::env::var("SIMPLEMEM_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("SIMPLEMEM_PROJECTS_ROOT") {
            self.storage.projects_root = val;
        }
        if let Ok(val) = std::env::var("SIMPLEMEM_LOG_LEVEL") {
            self.log.level = val;
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = BridgeConfig::default();
        assert_eq!(config.engine.root, "/tmp/SimpleMem");
        assert_eq!(config.engine.entry_point, "main.py");
        assert_eq!(config.storage.db_path, "/tmp/simplemem_db");
        assert_eq!(config.storage.project_prefix, "simplemem-");
        assert_eq!(config.install.clone_timeout_secs, 60);
        assert_eq!(config.install.deps_timeout_secs, 300);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[engine]
root = "/opt/simplemem"

[storage]
db_path = "/tmp/test_db"

[install]
pip = "pip3"
pip_args = []
"#;
        let config: BridgeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.engine.root, "/opt/simplemem");
        assert_eq!(config.storage.db_path, "/tmp/test_db");
        assert_eq!(config.install.pip, "pip3");
        assert!(config.install.pip_args.is_empty());
        // defaults still apply for unset fields
        assert_eq!(config.engine.python, "python3");
        assert_eq!(config.storage.projects_root, "~/.claude/projects");
        assert_eq!(config.install.git, "git");
    }

    #[test]
    fn engine_paths_hang_off_root() {
        let mut config = EngineConfig::default();
        config.root = "/opt/sm".into();
        assert_eq!(config.entry_point_path(), PathBuf::from("/opt/sm/main.py"));
        assert_eq!(config.config_file_path(), PathBuf::from("/opt/sm/config.py"));
        assert_eq!(
            config.config_template_path(),
            PathBuf::from("/opt/sm/config.py.example")
        );
    }

    #[test]
    fn installed_requires_entry_point() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = EngineConfig::default();
        config.root = tmp.path().to_string_lossy().into_owned();
        assert!(!config.is_installed());

        std::fs::write(tmp.path().join("main.py"), "# engine").unwrap();
        assert!(config.is_installed());
    }

    #[test]
    fn tilde_expands_to_home() {
        let expanded = expand_tilde("~/.claude/projects");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join(".claude/projects"));
        }
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = BridgeConfig::default();
        std::env::set_var("SIMPLEMEM_ROOT", "/tmp/override-root");
        std::env::set_var("SIMPLEMEM_DB", "/tmp/override-db");
        std::env::set_var("SIMPLEMEM_PROJECTS_ROOT", "/tmp/override-projects");
        std::env::set_var("SIMPLEMEM_LOG_LEVEL", "trace");

        config.apply_env_overrides();

        assert_eq!(config.engine.root, "/tmp/override-root");
        assert_eq!(config.storage.db_path, "/tmp/override-db");
        assert_eq!(config.storage.projects_root, "/tmp/override-projects");
        assert_eq!(config.log.level, "trace");

        // Clean up
        std::env::remove_var("SIMPLEMEM_ROOT");
        std::env::remove_var("SIMPLEMEM_DB");
        std::env::remove_var("SIMPLEMEM_PROJECTS_ROOT");
        std::env::remove_var("SIMPLEMEM_LOG_LEVEL");
    }
}
