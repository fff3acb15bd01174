//! A stand-in SimpleMem checkout for tests that drive a real interpreter.

use simplemem_bridge::config::EngineConfig;
use std::process::Command;

/// Minimal `SimpleMemSystem`: stores finalized records as JSON in the db dir,
/// answers `ask` with substring matches, and prints noise on stdout.
pub const FAKE_SIMPLEMEM: &str = r#"
import json, os

class SimpleMemSystem:
    def __init__(self, clear_db=False, db_path=None):
        os.makedirs(db_path, exist_ok=True)
        self.store = os.path.join(db_path, "records.json")
        self.pending = []
        print("SimpleMemSystem initialized")

    def _load(self):
        if not os.path.exists(self.store):
            return []
        with open(self.store) as f:
            return json.load(f)

    def add_dialogue(self, speaker, content, timestamp, metadata=None):
        self.pending.append({
            "speaker": speaker,
            "content": content,
            "timestamp": timestamp,
            "metadata": metadata,
        })

    def finalize(self):
        records = self._load() + self.pending
        with open(self.store, "w") as f:
            json.dump(records, f)
        self.pending = []
        print("compressed %d records" % len(records))

    def ask(self, query, top_k=5):
        if query == "explode":
            raise RuntimeError("retrieval exploded")
        hits = [r["content"] for r in self._load() if query.lower() in r["content"].lower()]
        return "\n".join(hits[:top_k])
"#;

pub fn python_available(python: &str) -> bool {
    Command::new(python)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Lay out the fake engine checkout under the config's root.
pub fn install_fake_simplemem(config: &EngineConfig) {
    let root = config.resolved_root();
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join(&config.entry_point), FAKE_SIMPLEMEM).unwrap();
}
