// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `remove_path` action: delete a path, optionally recursive. Irreversible
//! — no natural inverse; a user who needs one supplies an inline `cleanup`
//! on the step.

use std::path::Path;

use ttp_core::ActionResult;

use crate::context::ExecutionContext;
use crate::error::ActionError;

pub fn validate() -> Result<(), ActionError> {
    Ok(())
}

pub fn execute(ctx: &mut ExecutionContext, path: &Path, recursive: bool) -> Result<ActionResult, ActionError> {
    let path = ctx.render_path(path)?;
    if recursive {
        ctx.fs.remove_all(&path)?;
    } else {
        ctx.fs.remove(&path)?;
    }
    Ok(ActionResult::ok(""))
}

#[cfg(test)]
#[path = "remove_path_tests.rs"]
mod tests;
