//! CLI `save` command.

use anyhow::Result;
use serde_json::{Map, Value};
use std::path::Path;

use simplemem_bridge::bridge::save::{save, save_conversation, SaveRequest, SaveResponse};
use simplemem_bridge::config::BridgeConfig;
use simplemem_bridge::engine::python::PythonEngineProvider;

pub struct SaveArgs<'a> {
    pub content: &'a str,
    pub speaker: &'a str,
    pub context: &'a str,
    pub assistant_message: Option<&'a str>,
    pub metadata: Option<&'a str>,
}

/// Validate input, save, print the response. Returns whether it succeeded.
pub fn run(config: &BridgeConfig, db_path: &Path, args: &SaveArgs<'_>) -> Result<bool> {
    let metadata = match args.metadata.map(parse_metadata).transpose() {
        Ok(m) => m,
        Err(message) => {
            super::print_json(&SaveResponse::failed(message))?;
            return Ok(false);
        }
    };

    let provider = PythonEngineProvider::new(&config.engine);
    let response = match args.assistant_message {
        Some(assistant) => {
            save_conversation(&provider, db_path, args.content, assistant, args.context)
        }
        None => save(
            &provider,
            db_path,
            &SaveRequest {
                content: args.content,
                speaker: args.speaker,
                context: args.context,
                metadata: metadata.as_ref(),
            },
        ),
    };

    super::print_json(&response)?;
    Ok(response.success)
}

/// `--metadata` must be a JSON object.
fn parse_metadata(raw: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("Invalid metadata JSON: expected an object".into()),
        Err(e) => Err(format!("Invalid metadata JSON: {e}")),
    }
}
