// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The mutable run-time environment threaded through the Step Runner and
//! Cleanup Controller.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ttp_core::{ActionResult, Filesystem, StepResultsRecord, StepState};
use ttp_playbook::{expand, Bindings, Step};

use crate::error::ActionError;

/// A `sub_ttp` step's nested run, stashed between its own `Execute` (which
/// defers the nested playbook's cleanup) and the outer Cleanup Controller
/// eventually reaching that step and calling its `Cleanup`.
pub struct NestedRun {
    pub ctx: ExecutionContext,
    pub env: HashMap<String, String>,
    pub steps: Vec<Step>,
    pub first_step_to_cleanup_idx: i64,
}

/// Owns everything an action needs to do its work, and nothing it
/// shouldn't be able to mutate directly.
///
/// Mutation discipline: only the Step Runner appends to
/// `results` via [`ExecutionContext::record_step`]; only the Cleanup
/// Controller calls [`ExecutionContext::record_cleanup`].
pub struct ExecutionContext {
    pub resolved_args: HashMap<String, String>,
    pub results: StepResultsRecord,
    pub fs: Arc<dyn Filesystem>,
    pub config: ttp_core::ExecutionConfig,
    /// Nested `sub_ttp` runs awaiting cleanup, keyed by the outer step's
    /// own index. Populated only when a nested run succeeds in full; a
    /// nested failure cleans itself up eagerly and never lands here.
    pub nested_runs: HashMap<usize, NestedRun>,
    /// Playbook-level env merged under the current step's own env (step
    /// wins), set by the Step Runner before each `Execute`. `shell` layers this over the host's inherited
    /// environment via `Command::envs`, which overrides rather than
    /// replaces it.
    pub current_env: HashMap<String, String>,
}

impl ExecutionContext {
    pub fn new(
        resolved_args: HashMap<String, String>,
        fs: Arc<dyn Filesystem>,
        config: ttp_core::ExecutionConfig,
    ) -> Self {
        Self {
            resolved_args,
            results: StepResultsRecord::new(),
            fs,
            config,
            nested_runs: HashMap::new(),
            current_env: HashMap::new(),
        }
    }

    /// Phase (b) re-expansion: render `text` against
    /// the current argument bindings plus every already-executed step's
    /// results.
    pub fn render(&self, text: &str) -> Result<String, ActionError> {
        let bindings = Bindings::with_steps(self.resolved_args.clone(), self.results.all_template_bindings());
        Ok(expand(text, &bindings)?)
    }

    pub fn render_path(&self, path: &Path) -> Result<PathBuf, ActionError> {
        Ok(PathBuf::from(self.render(&path.to_string_lossy())?))
    }

    pub fn record_step(
        &mut self,
        step_name: impl Into<String>,
        state: StepState,
        execute: Option<ActionResult>,
    ) -> usize {
        self.results.push(step_name, state, execute)
    }

    pub fn record_cleanup(&mut self, index: usize, result: ActionResult) {
        self.results.set_cleanup(index, result);
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
