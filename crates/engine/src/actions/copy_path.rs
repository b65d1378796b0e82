// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `copy_path` action: copy a file or directory to a destination. Natural
//! inverse: remove the destination.

use std::path::Path;

use ttp_core::ActionResult;

use crate::context::ExecutionContext;
use crate::error::ActionError;

pub fn validate() -> Result<(), ActionError> {
    Ok(())
}

pub fn execute(ctx: &mut ExecutionContext, src: &Path, dest: &Path) -> Result<ActionResult, ActionError> {
    let src = ctx.render_path(src)?;
    let dest = ctx.render_path(dest)?;
    ctx.fs.copy(&src, &dest)?;
    Ok(ActionResult::ok(""))
}

pub fn cleanup(ctx: &mut ExecutionContext, dest: &Path) -> Result<ActionResult, ActionError> {
    let dest = ctx.render_path(dest)?;
    match ctx.fs.remove_all(&dest) {
        Ok(()) => Ok(ActionResult::ok("")),
        Err(ttp_core::FsError::NotFound(_)) => Ok(ActionResult::ok("")),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "copy_path_tests.rs"]
mod tests;
