// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `print_str` action: emit a message to the log sink. No natural inverse.

use ttp_core::ActionResult;

use crate::context::ExecutionContext;
use crate::error::ActionError;

pub fn validate() -> Result<(), ActionError> {
    Ok(())
}

pub fn execute(ctx: &mut ExecutionContext, message: &str) -> Result<ActionResult, ActionError> {
    let message = ctx.render(message)?;
    tracing::info!(%message, "print_str");
    Ok(ActionResult::ok(message))
}

#[cfg(test)]
#[path = "print_str_tests.rs"]
mod tests;
