//! Which database directory an invocation operates on.
//!
//! A project store is named after a digest of the working directory, so the
//! same checkout always maps to the same store and different checkouts do not
//! collide in practice.

use md5::{Digest, Md5};
use std::path::{Path, PathBuf};

use crate::config::StorageConfig;

/// Number of hex characters of the digest kept in a project identifier (64 bits).
pub const PROJECT_HASH_LEN: usize = 16;

/// A resolved database directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// The shared store: the configured default or an explicit `--db-path`.
    Global(PathBuf),
    /// A store derived from the working directory.
    Project(PathBuf),
}

impl StorageLocation {
    pub fn path(&self) -> &Path {
        match self {
            Self::Global(p) | Self::Project(p) => p,
        }
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            Self::Global(p) | Self::Project(p) => p,
        }
    }

    pub fn is_project(&self) -> bool {
        matches!(self, Self::Project(_))
    }
}

/// Stable identifier for a working directory: `<prefix><first 16 hex chars of md5(cwd)>`.
pub fn project_id(cwd: &Path, prefix: &str) -> String {
    let digest = Md5::digest(cwd.to_string_lossy().as_bytes());
    let hex = hex::encode(digest);
    format!("{prefix}{}", &hex[..PROJECT_HASH_LEN])
}

/// Project store path for `cwd` under the configured projects root.
pub fn project_db_path(storage: &StorageConfig, cwd: &Path) -> PathBuf {
    storage
        .resolved_projects_root()
        .join(project_id(cwd, &storage.project_prefix))
}

/// Pick the database for one invocation.
///
/// `use_project` wins over `explicit`; an explicit path given alongside
/// `--project` is ignored without error. Without either, the configured
/// global path is used.
pub fn select_location(
    storage: &StorageConfig,
    explicit: Option<&Path>,
    use_project: bool,
    cwd: &Path,
) -> StorageLocation {
    if use_project {
        if let Some(ignored) = explicit {
            tracing::debug!(ignored = %ignored.display(), "project scope overrides explicit db path");
        }
        let path = project_db_path(storage, cwd);
        tracing::debug!(cwd = %cwd.display(), db = %path.display(), "project store selected");
        return StorageLocation::Project(path);
    }

    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => storage.resolved_db_path(),
    };
    StorageLocation::Global(path)
}
