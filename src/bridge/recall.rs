//! Read path.

use serde::Serialize;
use std::path::Path;

use crate::engine::{EngineProvider, EngineResult, MemoryEngine};

pub const DEFAULT_TOP_K: usize = 5;

/// Result of a recall.
///
/// `found: false` with `success: true` is a clean miss; `success: false` is an
/// operational failure and always carries `found: false` and an empty context.
#[derive(Debug, Clone, Serialize)]
pub struct RecallResponse {
    pub success: bool,
    pub query: String,
    pub context: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Ask the engine for context relevant to `query`.
pub fn recall<P: EngineProvider>(
    provider: &P,
    db_path: &Path,
    query: &str,
    top_k: usize,
) -> RecallResponse {
    tracing::info!(db = %db_path.display(), query = %query, top_k, "recall called");

    match ask(provider, db_path, query, top_k) {
        Ok(context) if !context.trim().is_empty() => RecallResponse {
            success: true,
            query: query.to_string(),
            context,
            found: true,
            message: Some(format!("Found relevant context for: {query}")),
            error: None,
        },
        Ok(_) => RecallResponse {
            success: true,
            query: query.to_string(),
            context: String::new(),
            found: false,
            message: Some(format!("No relevant memories found for: {query}")),
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "recall failed");
            RecallResponse {
                success: false,
                query: query.to_string(),
                context: String::new(),
                found: false,
                message: None,
                error: Some(e.to_string()),
            }
        }
    }
}

fn ask<P: EngineProvider>(
    provider: &P,
    db_path: &Path,
    query: &str,
    top_k: usize,
) -> EngineResult<String> {
    let mut engine = provider.open(db_path)?;
    engine.query(query, top_k)
}
