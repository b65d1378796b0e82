// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `create_file` action: write a file, honoring `overwrite`. Natural
//! inverse: remove it.

use std::path::Path;

use ttp_core::ActionResult;

use crate::context::ExecutionContext;
use crate::error::ActionError;

pub fn validate() -> Result<(), ActionError> {
    Ok(())
}

pub fn execute(
    ctx: &mut ExecutionContext,
    path: &Path,
    contents: &str,
    overwrite: bool,
) -> Result<ActionResult, ActionError> {
    let path = ctx.render_path(path)?;
    let contents = ctx.render(contents)?;
    ctx.fs.write(&path, &contents, overwrite)?;
    Ok(ActionResult::ok(""))
}

/// Cleanup ignores a missing file: a step that never ran (e.g. skipped by
/// `if`) never reaches the cleanup frontier, but a user-removed file
/// between execution and cleanup should not turn a best-effort cleanup
/// into a hard failure.
pub fn cleanup(ctx: &mut ExecutionContext, path: &Path) -> Result<ActionResult, ActionError> {
    let path = ctx.render_path(path)?;
    match ctx.fs.remove(&path) {
        Ok(()) => Ok(ActionResult::ok("")),
        Err(ttp_core::FsError::NotFound(_)) => Ok(ActionResult::ok("")),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "create_file_tests.rs"]
mod tests;
