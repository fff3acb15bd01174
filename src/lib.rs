//! Command-line memory bridge for AI agents.
//!
//! `simplemem` lets a tool-calling harness persist and retrieve conversational
//! memory through four one-shot commands: `install`, `save`, `recall`, and
//! `status`. Each run prints exactly one JSON document on stdout and signals
//! the outcome through its exit code.
//!
//! The memory engine itself (embedding, retrieval, compression) is
//! [SimpleMem](https://github.com/aiming-lab/SimpleMem), reached through the
//! narrow [`engine::MemoryEngine`] contract.
//!
//! | Store | Path |
//! |-------|------|
//! | **Global** | `storage.db_path` (default `/tmp/simplemem_db`) or `--db-path` |
//! | **Project** | `~/.claude/projects/simplemem-<md5(cwd)[..16]>` with `--project` |
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`engine`] — Engine contract and the Python subprocess implementation
//! - [`bridge`] — Location policy, save, recall, and the status report
//! - [`install`] — Clone, dependency install, and config rendering for the engine

pub mod bridge;
pub mod config;
pub mod engine;
pub mod install;
