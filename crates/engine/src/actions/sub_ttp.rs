// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sub_ttp` action: load and run a nested playbook with supplied
//! arguments, in the same process.
//!
//! The nested playbook gets its own [`ExecutionContext`] — its own
//! argument bindings and step results, sharing only the filesystem and
//! execution config with the parent. Its cleanup is deferred rather than
//! run inline:
//!
//! - On full nested success, the nested context, its steps, and its own
//!   cleanup frontier are stashed in [`crate::context::NestedRun`] under
//!   this step's index. The nested playbook's own side effects (e.g. the
//!   files it staged) persist until the *outer* Cleanup Controller
//!   eventually reaches this step and calls [`cleanup`] — matching how
//!   every other action's natural inverse is deferred to the outer run's
//!   cleanup phase, not fired immediately after `Execute`.
//! - On nested failure, the nested run's own Cleanup Controller runs
//!   eagerly, right here inside `execute`, against whatever nested steps
//!   had already succeeded — "inner cleanup removes \[staged files\] at
//!   failure time". Nothing is stashed in that case,
//!   so the outer runner's immediate-cleanup-on-failure call to
//!   [`cleanup`] (triggered by `should_cleanup_on_failure`) finds nothing
//!   to do and is a no-op — "outer cleanup does not re-run the sub_ttp
//!   cleanup".

use std::collections::HashMap;
use std::path::Path;

use ttp_core::ActionResult;

use crate::context::{ExecutionContext, NestedRun};
use crate::error::ActionError;

pub fn validate(ctx: &ExecutionContext, _step_index: usize, path: &Path) -> Result<(), ActionError> {
    let path = ctx.render_path(path)?;
    if !ctx.fs.exists(&path) {
        return Err(ActionError::SubPlaybook(format!(
            "sub_ttp target does not exist: {}",
            path.display()
        )));
    }
    Ok(())
}

pub fn execute(
    ctx: &mut ExecutionContext,
    step_index: usize,
    path: &Path,
    args: &HashMap<String, String>,
) -> Result<ActionResult, ActionError> {
    let path = ctx.render_path(path)?;
    let raw = ctx.fs.read_to_string(&path)?;

    let rendered_args: HashMap<String, String> = args
        .iter()
        .map(|(k, v)| Ok((k.clone(), ctx.render(v)?)))
        .collect::<Result<_, ActionError>>()?;

    let (playbook, resolved_args) =
        ttp_playbook::load(&raw, &rendered_args).map_err(|e| ActionError::SubPlaybook(e.to_string()))?;

    let mut nested_ctx = ExecutionContext::new(resolved_args, ctx.fs.clone(), ctx.config);

    let outcome = crate::runner::run_steps(&mut nested_ctx, &playbook.env, &playbook.steps);

    match outcome.error {
        Some(err) => {
            if !ctx.config.no_cleanup {
                crate::cleanup::run_cleanup(
                    &mut nested_ctx,
                    &playbook.env,
                    &playbook.steps,
                    outcome.first_step_to_cleanup_idx,
                );
            }
            Err(ActionError::SubPlaybook(format!(
                "{}: {err}",
                path.display()
            )))
        }
        None => {
            ctx.nested_runs.insert(
                step_index,
                NestedRun {
                    ctx: nested_ctx,
                    env: playbook.env,
                    steps: playbook.steps,
                    first_step_to_cleanup_idx: outcome.first_step_to_cleanup_idx,
                },
            );
            Ok(ActionResult::ok(format!("sub_ttp {} completed", path.display())))
        }
    }
}

/// Runs the nested playbook's own cleanup, deferred from `execute`. A
/// no-op when nothing was stashed — either this step never ran, or the
/// nested run already cleaned itself up on failure.
pub fn cleanup(ctx: &mut ExecutionContext, step_index: usize) -> Result<ActionResult, ActionError> {
    let Some(mut nested) = ctx.nested_runs.remove(&step_index) else {
        return Ok(ActionResult::ok(""));
    };
    crate::cleanup::run_cleanup(
        &mut nested.ctx,
        &nested.env,
        &nested.steps,
        nested.first_step_to_cleanup_idx,
    );
    Ok(ActionResult::ok(""))
}

#[cfg(test)]
#[path = "sub_ttp_tests.rs"]
mod tests;
