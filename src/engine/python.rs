//! SimpleMem engine driven through a Python interpreter.
//!
//! Each engine call spawns one interpreter running [`HELPER`], which reads a
//! JSON request on stdin and answers with exactly one JSON line on stdout.
//! Anything SimpleMem prints itself is diverted to stderr so it cannot corrupt
//! the reply. The caller's working directory is dropped from the module search
//! path, so project files cannot shadow stdlib or engine imports.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{EngineError, EngineProvider, EngineResult, MemoryEngine, MemoryRecord};
use crate::config::EngineConfig;

const HELPER: &str = r#"
import sys
sys.path[:] = [p for p in sys.path if p not in ("", ".")]
import json
out = sys.stdout
sys.stdout = sys.stderr

def reply(payload):
    out.write(json.dumps(payload) + "\n")
    out.flush()

try:
    req = json.load(sys.stdin)
    sys.path.insert(0, req["root"])
    from main import SimpleMemSystem
    op = req["op"]
    if op == "check_import":
        reply({"ok": True})
    elif op == "save":
        memory = SimpleMemSystem(clear_db=False, db_path=req["db_path"])
        for r in req["records"]:
            memory.add_dialogue(
                speaker=r["speaker"],
                content=r["content"],
                timestamp=r["timestamp"],
                metadata=r["metadata"],
            )
        memory.finalize()
        reply({"ok": True})
    elif op == "ask":
        memory = SimpleMemSystem(clear_db=False, db_path=req["db_path"])
        context = memory.ask(req["query"], top_k=req["top_k"])
        if context is None:
            context = ""
        reply({"ok": True, "context": context if isinstance(context, str) else str(context)})
    else:
        reply({"ok": False, "error": "unknown op: %s" % op})
except BaseException as e:
    reply({"ok": False, "error": str(e) or type(e).__name__})
"#;

#[derive(Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request<'a> {
    CheckImport {
        root: &'a Path,
    },
    Save {
        root: &'a Path,
        db_path: &'a Path,
        records: &'a [MemoryRecord],
    },
    Ask {
        root: &'a Path,
        db_path: &'a Path,
        query: &'a str,
        top_k: usize,
    },
}

#[derive(Debug, Deserialize)]
struct Reply {
    ok: bool,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Opens [`PythonEngine`] handles against an installed SimpleMem checkout.
#[derive(Debug, Clone)]
pub struct PythonEngineProvider {
    python: String,
    root: PathBuf,
    entry_point: PathBuf,
}

impl PythonEngineProvider {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            python: config.python.clone(),
            root: config.resolved_root(),
            entry_point: config.entry_point_path(),
        }
    }

    fn ensure_installed(&self) -> EngineResult<()> {
        if self.entry_point.is_file() {
            Ok(())
        } else {
            Err(EngineError::NotInstalled {
                root: self.root.clone(),
            })
        }
    }
}

impl EngineProvider for PythonEngineProvider {
    type Engine = PythonEngine;

    fn open(&self, db_path: &Path) -> EngineResult<PythonEngine> {
        self.ensure_installed()?;
        tracing::debug!(db = %db_path.display(), root = %self.root.display(), "engine handle opened");
        Ok(PythonEngine {
            python: self.python.clone(),
            root: self.root.clone(),
            db_path: db_path.to_path_buf(),
            pending: Vec::new(),
        })
    }

    fn check_import(&self) -> EngineResult<()> {
        self.ensure_installed()?;
        let request = Request::CheckImport { root: &self.root };
        run_helper(&self.python, "import", &request).map(|_| ())
    }
}

/// Engine handle bound to one database directory.
///
/// Ingested records are held here and replayed into a single interpreter on
/// [`consolidate`](MemoryEngine::consolidate), so they share one
/// `SimpleMemSystem` instance exactly as an in-process caller would.
#[derive(Debug)]
pub struct PythonEngine {
    python: String,
    root: PathBuf,
    db_path: PathBuf,
    pending: Vec<MemoryRecord>,
}

impl PythonEngine {
    pub fn pending(&self) -> &[MemoryRecord] {
        &self.pending
    }
}

impl MemoryEngine for PythonEngine {
    fn ingest(&mut self, record: &MemoryRecord) -> EngineResult<()> {
        tracing::debug!(speaker = %record.speaker, content_len = record.content.len(), "record queued");
        self.pending.push(record.clone());
        Ok(())
    }

    fn query(&mut self, text: &str, top_k: usize) -> EngineResult<String> {
        let request = Request::Ask {
            root: &self.root,
            db_path: &self.db_path,
            query: text,
            top_k,
        };
        let reply = run_helper(&self.python, "ask", &request)?;
        Ok(reply.context.unwrap_or_default())
    }

    fn consolidate(&mut self) -> EngineResult<()> {
        let request = Request::Save {
            root: &self.root,
            db_path: &self.db_path,
            records: &self.pending,
        };
        run_helper(&self.python, "finalize", &request)?;
        tracing::info!(records = self.pending.len(), db = %self.db_path.display(), "memory consolidated");
        self.pending.clear();
        Ok(())
    }
}

fn run_helper(python: &str, stage: &'static str, request: &Request<'_>) -> EngineResult<Reply> {
    let payload = serde_json::to_vec(request)?;

    let mut child = Command::new(python)
        .arg("-c")
        .arg(HELPER)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| EngineError::Spawn {
            program: python.to_string(),
            source,
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(&payload).map_err(|source| EngineError::Spawn {
            program: python.to_string(),
            source,
        })?;
    }

    let output = child.wait_with_output().map_err(|source| EngineError::Spawn {
        program: python.to_string(),
        source,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let Some(line) = stdout.lines().rev().find(|l| !l.trim().is_empty()) else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = match stderr.trim() {
            "" => format!("interpreter exited with {}", output.status),
            s => s.to_string(),
        };
        return Err(EngineError::Engine { stage, message });
    };

    let reply: Reply = serde_json::from_str(line)?;
    if reply.ok {
        Ok(reply)
    } else {
        Err(EngineError::Engine {
            stage,
            message: reply.error.unwrap_or_else(|| "unknown engine error".into()),
        })
    }
}
