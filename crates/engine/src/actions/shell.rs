// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `shell` / `inline` action: run a command through a shell interpreter,
//! capturing stdio and exit status.

use std::process::Command;

use ttp_core::ActionResult;

use crate::context::ExecutionContext;
use crate::error::ActionError;

pub fn validate() -> Result<(), ActionError> {
    Ok(())
}

pub fn execute(ctx: &mut ExecutionContext, cmd: &str) -> Result<ActionResult, ActionError> {
    let rendered = ctx.render(cmd)?;

    tracing::info!(command = %rendered, "running shell command");

    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(&rendered);
        c
    } else {
        let wrapped = format!("set -euo pipefail\n{rendered}");
        let mut c = Command::new("sh");
        c.arg("-c").arg(wrapped);
        c
    };
    command.envs(&ctx.current_env);
    let output = command.output()?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let status = output.status.code();

    if !stdout.is_empty() {
        tracing::info!(%stdout, "shell stdout");
    }
    if !stderr.is_empty() {
        tracing::warn!(%stderr, "shell stderr");
    }

    if !output.status.success() {
        tracing::error!(status, "shell command exited non-zero");
        return Err(ActionError::NonZeroExit { status, stderr });
    }

    Ok(ActionResult {
        stdout,
        stderr,
        status,
        outputs: Default::default(),
    })
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
