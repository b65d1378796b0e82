// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `edit_file` action: ordered append/delete/replace edits, literal or
//! regexp, over the file's then-current contents. Natural inverse:
//! restore the pre-edit contents.
//!
//! The pre-edit contents are stashed in the execute result's `outputs`
//! under [`BACKUP_KEY`] rather than written to a sidecar file — this
//! abstraction's [`ttp_core::Filesystem`] has no notion of hidden files,
//! and the in-memory test double would have no way to clean one up.

use std::path::Path;

use regex::Regex;

use ttp_core::ActionResult;
use ttp_playbook::EditOp;

use crate::context::ExecutionContext;
use crate::error::ActionError;

const BACKUP_KEY: &str = "_backup_contents";

pub fn validate() -> Result<(), ActionError> {
    Ok(())
}

pub fn execute(
    ctx: &mut ExecutionContext,
    path: &Path,
    edits: &[EditOp],
) -> Result<ActionResult, ActionError> {
    let path = ctx.render_path(path)?;
    let original = ctx.fs.read_to_string(&path)?;

    let mut content = original.clone();
    for edit in edits {
        content = apply_edit(ctx, edit, content)?;
    }

    ctx.fs.write(&path, &content, true)?;

    let mut result = ActionResult::ok("");
    result.outputs.insert(BACKUP_KEY.to_string(), original);
    Ok(result)
}

fn apply_edit(ctx: &ExecutionContext, edit: &EditOp, content: String) -> Result<String, ActionError> {
    match edit {
        EditOp::Append { line } => {
            let line = ctx.render(line)?;
            let mut content = content;
            content.push_str(&line);
            content.push('\n');
            Ok(content)
        }
        EditOp::Delete { pattern, regexp } => {
            let pattern = ctx.render(pattern)?;
            if *regexp {
                let re = Regex::new(&pattern).map_err(|e| ActionError::InvalidRegex {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
                Ok(re.replace_all(&content, "").into_owned())
            } else {
                Ok(content.replace(pattern.as_str(), ""))
            }
        }
        EditOp::Replace {
            pattern,
            replacement,
            regexp,
        } => {
            let pattern = ctx.render(pattern)?;
            let replacement = ctx.render(replacement)?;
            if *regexp {
                let re = Regex::new(&pattern).map_err(|e| ActionError::InvalidRegex {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
                Ok(re.replace_all(&content, replacement.as_str()).into_owned())
            } else {
                Ok(content.replace(pattern.as_str(), &replacement))
            }
        }
    }
}

pub fn cleanup(
    ctx: &mut ExecutionContext,
    path: &Path,
    prior: Option<&ActionResult>,
) -> Result<ActionResult, ActionError> {
    let path = ctx.render_path(path)?;
    let Some(backup) = prior.and_then(|r| r.outputs.get(BACKUP_KEY)) else {
        return Ok(ActionResult::ok(""));
    };
    ctx.fs.write(&path, backup, true)?;
    Ok(ActionResult::ok(""))
}

#[cfg(test)]
#[path = "edit_file_tests.rs"]
mod tests;
