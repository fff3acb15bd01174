#![allow(dead_code)]

pub mod python;

use simplemem_bridge::config::EngineConfig;
use simplemem_bridge::engine::{
    EngineError, EngineProvider, EngineResult, MemoryEngine, MemoryRecord,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Every call the bridge makes against the fake engine, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open(PathBuf),
    Ingest(MemoryRecord),
    Query(String, usize),
    Consolidate,
}

/// Which stage of the fake engine should raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Open,
    Ingest,
    Query,
    Consolidate,
}

/// Test double for the external engine: records calls, returns a scripted
/// query reply, and can be told to fail at one stage.
#[derive(Debug, Clone, Default)]
pub struct FakeEngineProvider {
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub reply: String,
    pub fail_at: Option<FailAt>,
    pub import_error: Option<String>,
}

impl FakeEngineProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Self::default()
        }
    }

    pub fn failing_at(stage: FailAt) -> Self {
        Self {
            fail_at: Some(stage),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ingested(&self) -> Vec<MemoryRecord> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Ingest(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn consolidations(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Consolidate))
            .count()
    }
}

pub struct FakeEngine {
    calls: Arc<Mutex<Vec<Call>>>,
    reply: String,
    fail_at: Option<FailAt>,
}

fn raised(stage: &'static str) -> EngineError {
    EngineError::Engine {
        stage,
        message: "simulated engine fault".into(),
    }
}

impl MemoryEngine for FakeEngine {
    fn ingest(&mut self, record: &MemoryRecord) -> EngineResult<()> {
        self.calls.lock().unwrap().push(Call::Ingest(record.clone()));
        if self.fail_at == Some(FailAt::Ingest) {
            return Err(raised("add_dialogue"));
        }
        Ok(())
    }

    fn query(&mut self, text: &str, top_k: usize) -> EngineResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Query(text.to_string(), top_k));
        if self.fail_at == Some(FailAt::Query) {
            return Err(raised("ask"));
        }
        Ok(self.reply.clone())
    }

    fn consolidate(&mut self) -> EngineResult<()> {
        self.calls.lock().unwrap().push(Call::Consolidate);
        if self.fail_at == Some(FailAt::Consolidate) {
            return Err(raised("finalize"));
        }
        Ok(())
    }
}

impl EngineProvider for FakeEngineProvider {
    type Engine = FakeEngine;

    fn open(&self, db_path: &Path) -> EngineResult<FakeEngine> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Open(db_path.to_path_buf()));
        if self.fail_at == Some(FailAt::Open) {
            return Err(raised("SimpleMemSystem"));
        }
        Ok(FakeEngine {
            calls: Arc::clone(&self.calls),
            reply: self.reply.clone(),
            fail_at: self.fail_at,
        })
    }

    fn check_import(&self) -> EngineResult<()> {
        match &self.import_error {
            Some(message) => Err(EngineError::Engine {
                stage: "import",
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Engine config rooted at `<tmp>/SimpleMem` (not created).
pub fn engine_config(tmp: &TempDir) -> EngineConfig {
    EngineConfig {
        root: tmp.path().join("SimpleMem").to_string_lossy().into_owned(),
        ..EngineConfig::default()
    }
}

/// Create the engine root with its entry point, as a finished install leaves it.
pub fn fake_install(config: &EngineConfig) {
    let root = config.resolved_root();
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join(&config.entry_point), "# SimpleMem entry point\n").unwrap();
}

/// Write the engine's config file with the given contents.
pub fn write_engine_config(config: &EngineConfig, contents: &str) {
    std::fs::write(config.config_file_path(), contents).unwrap();
}
