//! Test helpers for behavioral specifications.
//!
//! Provides a small DSL for loading and running a playbook document
//! against an in-memory filesystem, without touching the real disk.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use ttp_core::{ExecutionConfig, Filesystem, MemFilesystem};
use ttp_engine::RunResult;
use ttp_playbook::Playbook;

/// Load a playbook document with the given caller-supplied arguments.
pub fn load(yaml: &str, args: &[(&str, &str)]) -> (Playbook, HashMap<String, String>) {
    let supplied: HashMap<String, String> = args.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    ttp_playbook::load(yaml, &supplied).expect("playbook should load")
}

/// A fresh, empty in-memory filesystem, shared between a run and the
/// test's own post-run assertions.
pub fn fresh_fs() -> Arc<MemFilesystem> {
    Arc::new(MemFilesystem::new())
}

/// Run a playbook document to completion with the default execution
/// config against `fs`.
pub fn run(fs: &Arc<MemFilesystem>, yaml: &str, args: &[(&str, &str)]) -> RunResult {
    run_with(fs, yaml, args, ExecutionConfig::new())
}

/// As [`run`], with an explicit [`ExecutionConfig`].
pub fn run_with(fs: &Arc<MemFilesystem>, yaml: &str, args: &[(&str, &str)], config: ExecutionConfig) -> RunResult {
    let (playbook, resolved_args) = load(yaml, args);
    let fs_dyn: Arc<dyn Filesystem> = fs.clone();
    ttp_engine::run(&playbook, resolved_args, fs_dyn, config, None)
}

pub fn path(p: &str) -> std::path::PathBuf {
    std::path::PathBuf::from(p)
}
