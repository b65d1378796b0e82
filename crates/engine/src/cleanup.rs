// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Cleanup Controller: walks steps in reverse from
//! `first_step_to_cleanup_idx` down to and including index 0, running
//! each step's own inverse (or its inline `cleanup` override) and
//! recording the result. Best-effort: a failing cleanup is logged and the
//! walk continues rather than aborting.

use std::collections::HashMap;

use ttp_core::ActionResult;
use ttp_playbook::{CleanupSpec, Step};

use crate::act::Act;
use crate::context::ExecutionContext;
use crate::error::ActionError;

pub fn run_cleanup(
    ctx: &mut ExecutionContext,
    playbook_env: &HashMap<String, String>,
    steps: &[Step],
    first_step_to_cleanup_idx: i64,
) {
    let mut idx = first_step_to_cleanup_idx;
    while idx >= 0 {
        let index = idx as usize;
        let Some(step) = steps.get(index) else {
            idx -= 1;
            continue;
        };

        ctx.current_env = playbook_env.clone();
        ctx.current_env.extend(step.env.clone());

        let prior = ctx.results.by_index(index).and_then(|o| o.execute.clone());

        match cleanup_step(ctx, step, index, prior.as_ref()) {
            Ok(result) => ctx.record_cleanup(index, result),
            Err(e) => tracing::warn!(step = %step.name, index, error = %e, "cleanup failed, continuing"),
        }

        idx -= 1;
    }
}

fn cleanup_step(
    ctx: &mut ExecutionContext,
    step: &Step,
    index: usize,
    prior: Option<&ActionResult>,
) -> Result<ActionResult, ActionError> {
    match &step.cleanup {
        CleanupSpec::NaturalInverse => step.action.cleanup(ctx, index, prior),
        CleanupSpec::Inline(override_action) => override_action.execute(ctx, index),
    }
}

#[cfg(test)]
#[path = "cleanup_tests.rs"]
mod tests;
