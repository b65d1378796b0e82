// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The uniform action contract.

use ttp_core::ActionResult;
use ttp_playbook::Action;

use crate::context::ExecutionContext;
use crate::error::ActionError;

/// Every action variant satisfies this contract. Implemented once, for
/// the closed [`Action`] enum, by dispatching to the `crate::actions`
/// submodule matching each variant — a local trait over a foreign type,
/// which Rust's orphan rule permits.
///
/// `step_index` is this step's own position in the owning playbook's step
/// list. Every variant but `sub_ttp` ignores it; `sub_ttp` uses it to key
/// the nested run it stashes between `Execute` and `Cleanup`.
pub trait Act {
    /// Static checks that may consult the execution context (e.g. whether
    /// a `sub_ttp` target resolves) but never perform a side effect.
    fn validate(&self, ctx: &ExecutionContext, step_index: usize) -> Result<(), ActionError>;

    /// Perform the side effect, producing stdout/stderr/status/outputs.
    fn execute(&self, ctx: &mut ExecutionContext, step_index: usize) -> Result<ActionResult, ActionError>;

    /// Reverse the action's effect, if it has a natural inverse. `prior`
    /// is this step's own `Execute` result, carrying any bookkeeping the
    /// action stashed in `outputs` for its own cleanup to consume (e.g.
    /// `edit_file`'s pre-edit backup).
    fn cleanup(
        &self,
        ctx: &mut ExecutionContext,
        step_index: usize,
        prior: Option<&ActionResult>,
    ) -> Result<ActionResult, ActionError>;

    /// True when partial progress may have left side effects even though
    /// `Execute` returned an error.
    fn should_cleanup_on_failure(&self) -> bool;
}

impl Act for Action {
    fn validate(&self, ctx: &ExecutionContext, step_index: usize) -> Result<(), ActionError> {
        match self {
            Action::Shell { .. } => crate::actions::shell::validate(),
            Action::CreateFile { .. } => crate::actions::create_file::validate(),
            Action::EditFile { .. } => crate::actions::edit_file::validate(),
            Action::CopyPath { .. } => crate::actions::copy_path::validate(),
            Action::RemovePath { .. } => crate::actions::remove_path::validate(),
            Action::FetchUri { .. } => crate::actions::fetch_uri::validate(),
            Action::PrintStr(_) => crate::actions::print_str::validate(),
            Action::SubTtp { path, .. } => crate::actions::sub_ttp::validate(ctx, step_index, path),
        }
    }

    fn execute(&self, ctx: &mut ExecutionContext, step_index: usize) -> Result<ActionResult, ActionError> {
        if ctx.config.dry_run {
            // print_str has no side effect to skip; every other variant
            // touches the filesystem, a subprocess, or the network.
            if let Action::PrintStr(message) = self {
                return crate::actions::print_str::execute(ctx, message);
            }
            return Ok(ActionResult::ok(format!("dry_run: skipped {}", self.kind_name())));
        }

        match self {
            Action::Shell { cmd } => crate::actions::shell::execute(ctx, cmd),
            Action::CreateFile {
                path,
                contents,
                overwrite,
            } => crate::actions::create_file::execute(ctx, path, contents, *overwrite),
            Action::EditFile { path, edits } => crate::actions::edit_file::execute(ctx, path, edits),
            Action::CopyPath { src, dest } => crate::actions::copy_path::execute(ctx, src, dest),
            Action::RemovePath { path, recursive } => {
                crate::actions::remove_path::execute(ctx, path, *recursive)
            }
            Action::FetchUri { uri, dest } => crate::actions::fetch_uri::execute(ctx, uri, dest),
            Action::PrintStr(message) => crate::actions::print_str::execute(ctx, message),
            Action::SubTtp { path, args } => crate::actions::sub_ttp::execute(ctx, step_index, path, args),
        }
    }

    fn cleanup(
        &self,
        ctx: &mut ExecutionContext,
        step_index: usize,
        prior: Option<&ActionResult>,
    ) -> Result<ActionResult, ActionError> {
        match self {
            Action::Shell { .. } => Ok(ActionResult::ok("")),
            Action::CreateFile { path, .. } => crate::actions::create_file::cleanup(ctx, path),
            Action::EditFile { path, .. } => crate::actions::edit_file::cleanup(ctx, path, prior),
            Action::CopyPath { dest, .. } => crate::actions::copy_path::cleanup(ctx, dest),
            Action::RemovePath { .. } => Ok(ActionResult::ok("")),
            Action::FetchUri { dest, .. } => crate::actions::fetch_uri::cleanup(ctx, dest),
            Action::PrintStr(_) => Ok(ActionResult::ok("")),
            Action::SubTtp { .. } => crate::actions::sub_ttp::cleanup(ctx, step_index),
        }
    }

    fn should_cleanup_on_failure(&self) -> bool {
        self.should_cleanup_on_failure()
    }
}

#[cfg(test)]
#[path = "act_tests.rs"]
mod tests;
