//! Write path: single records and conversation turns.
//!
//! Both entry points open a handle non-destructively, ingest, and then
//! consolidate exactly once. Any engine failure becomes a `success: false`
//! response; nothing here returns `Err`.

use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

use crate::engine::{EngineProvider, EngineResult, MemoryEngine, MemoryRecord};

/// Characters of content echoed back in the response message.
pub const PREVIEW_CHARS: usize = 60;

pub const DEFAULT_SPEAKER: &str = "User";
pub const ASSISTANT_SPEAKER: &str = "Assistant";
pub const DEFAULT_CONTEXT: &str = "general";

/// Inputs for a single-record save.
#[derive(Debug, Clone)]
pub struct SaveRequest<'a> {
    pub content: &'a str,
    pub speaker: &'a str,
    pub context: &'a str,
    pub metadata: Option<&'a Map<String, Value>>,
}

impl<'a> SaveRequest<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            speaker: DEFAULT_SPEAKER,
            context: DEFAULT_CONTEXT,
            metadata: None,
        }
    }
}

/// Result of a save or save-conversation call.
#[derive(Debug, Clone, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveResponse {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            speaker: None,
            context: None,
            timestamp: None,
            error: Some(error.into()),
        }
    }
}

/// Save one record and consolidate.
pub fn save<P: EngineProvider>(
    provider: &P,
    db_path: &Path,
    request: &SaveRequest<'_>,
) -> SaveResponse {
    let timestamp = now_timestamp();
    let record = MemoryRecord {
        speaker: request.speaker.to_string(),
        content: request.content.to_string(),
        timestamp: timestamp.clone(),
        metadata: build_metadata(request.context, request.metadata),
    };

    tracing::info!(
        db = %db_path.display(),
        speaker = %request.speaker,
        context = %request.context,
        content_len = request.content.len(),
        "save called"
    );

    match commit(provider, db_path, &[record]) {
        Ok(()) => SaveResponse {
            success: true,
            message: Some(format!("Saved to memory: {}", preview(request.content))),
            speaker: Some(request.speaker.to_string()),
            context: Some(request.context.to_string()),
            timestamp: Some(timestamp),
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "save failed");
            SaveResponse::failed(e.to_string())
        }
    }
}

/// Save a user/assistant exchange as two records sharing one timestamp.
pub fn save_conversation<P: EngineProvider>(
    provider: &P,
    db_path: &Path,
    user_message: &str,
    assistant_message: &str,
    context: &str,
) -> SaveResponse {
    let timestamp = now_timestamp();
    let turn = |speaker: &str, content: &str| MemoryRecord {
        speaker: speaker.to_string(),
        content: content.to_string(),
        timestamp: timestamp.clone(),
        metadata: build_metadata(context, None),
    };
    let records = [
        turn(DEFAULT_SPEAKER, user_message),
        turn(ASSISTANT_SPEAKER, assistant_message),
    ];

    tracing::info!(db = %db_path.display(), context = %context, "save_conversation called");

    match commit(provider, db_path, &records) {
        Ok(()) => SaveResponse {
            success: true,
            message: Some(format!("Saved conversation to memory (context: {context})")),
            speaker: None,
            context: Some(context.to_string()),
            timestamp: Some(timestamp),
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "save_conversation failed");
            SaveResponse::failed(e.to_string())
        }
    }
}

/// Open, ingest every record in order, then consolidate once.
fn commit<P: EngineProvider>(
    provider: &P,
    db_path: &Path,
    records: &[MemoryRecord],
) -> EngineResult<()> {
    let mut engine = provider.open(db_path)?;
    for record in records {
        engine.ingest(record)?;
    }
    engine.consolidate()
}

/// `{"context": context}` with caller metadata layered on top.
///
/// A caller-supplied `context` key replaces the seeded one.
pub fn build_metadata(context: &str, extra: Option<&Map<String, Value>>) -> Map<String, Value> {
    let mut metadata = Map::new();
    metadata.insert("context".into(), Value::String(context.to_string()));
    if let Some(extra) = extra {
        for (k, v) in extra {
            metadata.insert(k.clone(), v.clone());
        }
    }
    metadata
}

/// First [`PREVIEW_CHARS`] characters, with `...` only when something was cut.
pub fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// Local time in ISO 8601 with microseconds, e.g. `2026-10-16T09:30:12.123456`.
pub fn now_timestamp() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_long_content() {
        let content = "A".repeat(100);
        let p = preview(&content);
        assert!(p.ends_with("..."));
        assert_eq!(p.len(), PREVIEW_CHARS + 3);
    }

    #[test]
    fn preview_keeps_exact_fit() {
        let content = "B".repeat(PREVIEW_CHARS);
        assert_eq!(preview(&content), content);
        assert_eq!(preview("hi"), "hi");
    }

    #[test]
    fn preview_counts_chars_not_bytes() {
        let content = "é".repeat(61);
        let p = preview(&content);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
    }

    #[test]
    fn metadata_seeds_context() {
        let m = build_metadata("work", None);
        assert_eq!(m.len(), 1);
        assert_eq!(m["context"], "work");
    }

    #[test]
    fn caller_metadata_merges_and_may_override_context() {
        let extra: Map<String, Value> =
            serde_json::from_str(r#"{"context": "override", "priority": 2}"#).unwrap();
        let m = build_metadata("work", Some(&extra));
        assert_eq!(m["context"], "override");
        assert_eq!(m["priority"], 2);
    }

    #[test]
    fn timestamp_is_iso8601() {
        let ts = now_timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%dT%H:%M:%S%.f").is_ok());
    }

    #[test]
    fn failed_response_serializes_only_error() {
        let json = serde_json::to_value(SaveResponse::failed("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "boom"}));
    }
}
