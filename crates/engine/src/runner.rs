// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Step Runner: walks a playbook's steps in order,
//! expanding phase (b) templates, executing each action, running its
//! success checks and output filters, and tracking the cleanup frontier.
//!
//! A step whose `Execute` succeeds but whose success check fails does
//! **not** advance `first_step_to_cleanup_idx` — its own side effects are
//! reported as failed and excluded from the normal reverse-order cleanup
//! walk, on the same reasoning as a step that never ran.

use std::collections::HashMap;

use ttp_core::StepState;
use ttp_playbook::Step;

use crate::act::Act;
use crate::checks::{apply_output_filters, run_success_checks};
use crate::context::ExecutionContext;
use crate::error::EngineError;
use crate::workdir::WorkdirGuard;

/// What the Step Runner learned about a step sequence: how far the
/// cleanup frontier reached, and the error (if any) that stopped it.
pub struct RunOutcome {
    pub first_step_to_cleanup_idx: i64,
    pub error: Option<EngineError>,
}

pub fn run_steps(ctx: &mut ExecutionContext, playbook_env: &HashMap<String, String>, steps: &[Step]) -> RunOutcome {
    let mut frontier: i64 = -1;

    for (index, step) in steps.iter().enumerate() {
        if let Some(cond) = &step.if_cond {
            match ctx.render(cond) {
                Ok(rendered) if !is_truthy(&rendered) => {
                    tracing::debug!(step = %step.name, "skipped (if condition false)");
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    return RunOutcome {
                        first_step_to_cleanup_idx: frontier,
                        error: Some(EngineError::Execution {
                            step: step.name.clone(),
                            source: e,
                        }),
                    };
                }
            }
        }

        ctx.current_env = playbook_env.clone();
        ctx.current_env.extend(step.env.clone());

        let _chdir_guard = match &step.chdir {
            Some(path) => match ctx.render_path(path) {
                Ok(rendered) => match WorkdirGuard::enter(&rendered) {
                    Ok(guard) => Some(guard),
                    Err(e) => {
                        return RunOutcome {
                            first_step_to_cleanup_idx: frontier,
                            error: Some(EngineError::Execution {
                                step: step.name.clone(),
                                source: e.into(),
                            }),
                        };
                    }
                },
                Err(e) => {
                    return RunOutcome {
                        first_step_to_cleanup_idx: frontier,
                        error: Some(EngineError::Execution {
                            step: step.name.clone(),
                            source: e,
                        }),
                    };
                }
            },
            None => None,
        };

        tracing::info!(step = %step.name, index, "executing step");

        match step.action.execute(ctx, index) {
            Ok(result) => {
                // Checks and output filters inspect side effects that
                // dry_run never performed, so both are skipped rather than
                // run against nothing.
                let checked = if ctx.config.dry_run {
                    Ok(())
                } else {
                    run_success_checks(ctx, &step.success_checks)
                };
                match checked {
                    Ok(()) => {
                        let filtered = if ctx.config.dry_run {
                            Ok(result)
                        } else {
                            apply_output_filters(ctx, result, &step.outputs)
                        };
                        match filtered {
                            Ok(final_result) => {
                                ctx.record_step(step.name.clone(), StepState::Succeeded, Some(final_result));
                                frontier = index as i64;
                            }
                            Err(e) => {
                                ctx.record_step(step.name.clone(), StepState::ExecuteFailed, None);
                                return RunOutcome {
                                    first_step_to_cleanup_idx: frontier,
                                    error: Some(EngineError::Execution {
                                        step: step.name.clone(),
                                        source: e,
                                    }),
                                };
                            }
                        }
                    }
                    Err(message) => {
                        ctx.record_step(step.name.clone(), StepState::CheckFailed, Some(result));
                        return RunOutcome {
                            first_step_to_cleanup_idx: frontier,
                            error: Some(EngineError::CheckFailed {
                                step: step.name.clone(),
                                message,
                            }),
                        };
                    }
                }
            }
            Err(e) => {
                if step.action.should_cleanup_on_failure() {
                    if let Err(cleanup_err) = step.action.cleanup(ctx, index, None) {
                        tracing::warn!(step = %step.name, error = %cleanup_err, "immediate cleanup-on-failure also failed");
                    }
                }
                ctx.record_step(step.name.clone(), StepState::ExecuteFailed, None);
                return RunOutcome {
                    first_step_to_cleanup_idx: frontier,
                    error: Some(EngineError::Execution {
                        step: step.name.clone(),
                        source: e,
                    }),
                };
            }
        }
    }

    RunOutcome {
        first_step_to_cleanup_idx: frontier,
        error: None,
    }
}

fn is_truthy(rendered: &str) -> bool {
    !matches!(rendered.trim(), "" | "false" | "0")
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
