//! Contract with the external memory engine.
//!
//! The bridge never stores, embeds, or ranks anything itself. It talks to the
//! engine through [`MemoryEngine`] (one handle bound to one database directory)
//! and obtains handles from an [`EngineProvider`]. The shipped provider is
//! [`python::PythonEngineProvider`], which drives an installed SimpleMem checkout.

pub mod python;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Value shipped in SimpleMem's config template in place of a real key.
pub const API_KEY_PLACEHOLDER: &str = "your-api-key-here";

/// The template's key assignment before a key is filled in.
pub const API_KEY_UNSET: &str = "OPENAI_API_KEY = None";

/// A single dialogue turn as handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub speaker: String,
    pub content: String,
    /// ISO 8601 local timestamp, e.g. `2026-10-16T09:30:12.123456`.
    pub timestamp: String,
    /// Always carries a `context` key.
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Failures surfaced by the external engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("SimpleMem not installed at {}. Run installation first", root.display())]
    NotInstalled { root: PathBuf },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} failed: {message}")]
    Engine { stage: &'static str, message: String },

    #[error("unreadable engine reply: {0}")]
    Protocol(#[from] serde_json::Error),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// A handle to the engine, bound to one database directory.
///
/// Handles are opened non-destructively: existing data in the directory is
/// kept. Records passed to [`ingest`](MemoryEngine::ingest) are not durable
/// until [`consolidate`](MemoryEngine::consolidate) has succeeded.
pub trait MemoryEngine {
    /// Hand one record to the engine's ingestion primitive.
    fn ingest(&mut self, record: &MemoryRecord) -> EngineResult<()>;

    /// Retrieve free-text context for `text`, using at most `top_k` matches.
    fn query(&mut self, text: &str, top_k: usize) -> EngineResult<String>;

    /// Run the engine's post-write compression step.
    fn consolidate(&mut self) -> EngineResult<()>;
}

/// Opens engine handles. Injected into every bridge operation.
pub trait EngineProvider {
    type Engine: MemoryEngine;

    /// Bind a handle to `db_path` without clearing it.
    fn open(&self, db_path: &Path) -> EngineResult<Self::Engine>;

    /// Check that the engine can be imported at all, without opening a store.
    fn check_import(&self) -> EngineResult<()>;
}
