// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fetch_uri` action: download to a path. Natural inverse: remove the
//! downloaded path.

use std::path::Path;

use ttp_core::ActionResult;

use crate::context::ExecutionContext;
use crate::error::ActionError;

pub fn validate() -> Result<(), ActionError> {
    Ok(())
}

pub fn execute(ctx: &mut ExecutionContext, uri: &str, dest: &Path) -> Result<ActionResult, ActionError> {
    let uri = ctx.render(uri)?;
    let dest = ctx.render_path(dest)?;

    let response = reqwest::blocking::get(&uri).map_err(|e| ActionError::Http(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(ActionError::Http(format!("{uri}: HTTP {status}")));
    }
    let body = response.text().map_err(|e| ActionError::Http(e.to_string()))?;

    ctx.fs.write(&dest, &body, true)?;

    let mut result = ActionResult::ok("");
    result.status = Some(status.as_u16() as i32);
    Ok(result)
}

pub fn cleanup(ctx: &mut ExecutionContext, dest: &Path) -> Result<ActionResult, ActionError> {
    let dest = ctx.render_path(dest)?;
    match ctx.fs.remove(&dest) {
        Ok(()) => Ok(ActionResult::ok("")),
        Err(ttp_core::FsError::NotFound(_)) => Ok(ActionResult::ok("")),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "fetch_uri_tests.rs"]
mod tests;
