// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Success checks and output filters, run after a step's `Execute`
//! succeeds.

use std::process::Command;

use ttp_core::ActionResult;
use ttp_playbook::{OutputFilter, SuccessCheck};

use crate::context::ExecutionContext;
use crate::error::ActionError;

/// Runs every declared check in order, stopping at the first failure.
/// Returns a human-readable message describing which check failed.
pub fn run_success_checks(ctx: &ExecutionContext, checks: &[SuccessCheck]) -> Result<(), String> {
    for check in checks {
        run_one(ctx, check).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn run_one(ctx: &ExecutionContext, check: &SuccessCheck) -> Result<(), ActionError> {
    match check {
        SuccessCheck::FileExists { path } => {
            let path = ctx.render_path(path)?;
            if !ctx.fs.exists(&path) {
                return Err(check_failed(format!("{} does not exist", path.display())));
            }
            Ok(())
        }
        SuccessCheck::FileContainsString { path, substring } => {
            let path = ctx.render_path(path)?;
            let substring = ctx.render(substring)?;
            let contents = ctx.fs.read_to_string(&path)?;
            if !contents.contains(&substring) {
                return Err(check_failed(format!(
                    "{} does not contain {substring:?}",
                    path.display()
                )));
            }
            Ok(())
        }
        SuccessCheck::CommandSucceeds { cmd } => {
            let cmd = ctx.render(cmd)?;
            let status = if cfg!(windows) {
                Command::new("cmd").arg("/C").arg(&cmd).status()?
            } else {
                Command::new("sh").arg("-c").arg(&cmd).status()?
            };
            if !status.success() {
                return Err(check_failed(format!("command exited with {status}: {cmd}")));
            }
            Ok(())
        }
    }
}

fn check_failed(message: String) -> ActionError {
    ActionError::CheckFailed(message)
}

/// Extracts each declared output filter's dotted `json_path` from `result`'s
/// stdout parsed as JSON, writing it into `result.outputs` under the
/// filter's `name`.
pub fn apply_output_filters(
    ctx: &ExecutionContext,
    mut result: ActionResult,
    filters: &[OutputFilter],
) -> Result<ActionResult, ActionError> {
    if filters.is_empty() {
        return Ok(result);
    }
    let parsed: serde_json::Value = serde_json::from_str(&result.stdout).map_err(|e| ActionError::OutputFilter {
        name: filters[0].name.clone(),
        message: format!("stdout is not valid JSON: {e}"),
    })?;
    for filter in filters {
        let json_path = ctx.render(&filter.json_path)?;
        let value = extract_json_path(&parsed, &json_path).ok_or_else(|| ActionError::OutputFilter {
            name: filter.name.clone(),
            message: format!("path {json_path:?} not found in stdout"),
        })?;
        result.outputs.insert(filter.name.clone(), value);
    }
    Ok(result)
}

fn extract_json_path(value: &serde_json::Value, path: &str) -> Option<String> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(scalar_to_string(current))
}

fn scalar_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "checks_tests.rs"]
mod tests;
