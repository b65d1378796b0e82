// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Orchestrator: the top-level entry point. Checks
//! declared requirements, acquires the playbook's working directory,
//! then runs the Step Runner followed unconditionally by the Cleanup
//! Controller (unless `config.no_cleanup`).

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use ttp_core::{ExecutionConfig, Filesystem};
use ttp_playbook::Playbook;

use crate::act::Act;
use crate::context::ExecutionContext;
use crate::error::EngineError;

/// What a top-level run produced: the final execution context (carrying
/// the step results record) and the error that stopped it, if any.
/// A requirement or validation failure populates a context only when
/// `config.force_cleanup` asked for a forced cleanup pass; otherwise no
/// step ran and there is nothing to report.
pub struct RunResult {
    pub ctx: Option<ExecutionContext>,
    pub error: Option<EngineError>,
}

/// Maps a run's outcome to the host CLI's exit code scheme. The CLI itself is out of scope; this is exposed for a
/// front end to call.
pub fn exit_code(result: &RunResult) -> i32 {
    match &result.error {
        None => 0,
        Some(EngineError::Execution { .. }) => 1,
        Some(EngineError::CheckFailed { .. }) => 1,
        Some(EngineError::Load(_)) => 2,
        Some(EngineError::Validation(_)) => 2,
        Some(EngineError::Requirement(_)) => 3,
    }
}

/// Runs `playbook` to completion (or first failure), honoring `config`.
///
/// `work_dir`, if set, becomes the process's current directory for the
/// duration of the run; `None` runs in
/// whatever directory the caller is already in.
pub fn run(
    playbook: &Playbook,
    resolved_args: std::collections::HashMap<String, String>,
    fs: Arc<dyn Filesystem>,
    config: ExecutionConfig,
    work_dir: Option<&Path>,
) -> RunResult {
    if let Err(message) = check_requirements(playbook, fs.as_ref()) {
        let ctx = config
            .force_cleanup
            .then(|| forced_cleanup(resolved_args.clone(), fs.clone(), config, playbook));
        return RunResult {
            ctx,
            error: Some(EngineError::Requirement(message)),
        };
    }

    let _workdir_guard = match work_dir {
        Some(path) => match crate::workdir::WorkdirGuard::enter(path) {
            Ok(guard) => Some(guard),
            Err(e) => {
                return RunResult {
                    ctx: None,
                    error: Some(EngineError::Requirement(format!(
                        "cannot enter working directory {}: {e}",
                        path.display()
                    ))),
                };
            }
        },
        None => None,
    };

    let mut ctx = ExecutionContext::new(resolved_args, fs, config);
    if let Err(message) = validate_steps(&ctx, &playbook.steps) {
        if config.force_cleanup {
            run_full_cleanup(&mut ctx, playbook);
        }
        return RunResult {
            ctx: if config.force_cleanup { Some(ctx) } else { None },
            error: Some(EngineError::Validation(message)),
        };
    }

    let outcome = crate::runner::run_steps(&mut ctx, &playbook.env, &playbook.steps);

    if !config.no_cleanup {
        if config.cleanup_delay_seconds > 0 {
            tracing::info!(seconds = config.cleanup_delay_seconds, "delaying cleanup");
            std::thread::sleep(Duration::from_secs(config.cleanup_delay_seconds));
        }
        crate::cleanup::run_cleanup(
            &mut ctx,
            &playbook.env,
            &playbook.steps,
            outcome.first_step_to_cleanup_idx,
        );
    }

    RunResult {
        ctx: Some(ctx),
        error: outcome.error,
    }
}

/// Runs every step's context-aware `Validate` before any step executes.
/// Static, fs-free checks already ran at load time
/// ([`Playbook::validate_structure`]); this pass additionally resolves
/// things like a `sub_ttp` target against the actual filesystem.
fn validate_steps(ctx: &ExecutionContext, steps: &[ttp_playbook::Step]) -> Result<(), String> {
    for (index, step) in steps.iter().enumerate() {
        step.action
            .validate(ctx, index)
            .map_err(|e| format!("step {:?}: {e}", step.name))?;
    }
    Ok(())
}

/// Walks every declared step's natural inverse, reverse order, as if the
/// whole playbook had run and failed on its very first step. Used only
/// when `config.force_cleanup` overrides a requirements failure that
/// happened before any context existed to clean up with.
fn forced_cleanup(
    resolved_args: std::collections::HashMap<String, String>,
    fs: Arc<dyn Filesystem>,
    config: ExecutionConfig,
    playbook: &Playbook,
) -> ExecutionContext {
    let mut ctx = ExecutionContext::new(resolved_args, fs, config);
    run_full_cleanup(&mut ctx, playbook);
    ctx
}

/// Walks every declared step's natural inverse, reverse order, regardless
/// of how far (if at all) execution actually reached — `force_cleanup`'s
/// override of the normal "only clean up what ran" rule.
fn run_full_cleanup(ctx: &mut ExecutionContext, playbook: &Playbook) {
    let frontier = playbook.steps.len() as i64 - 1;
    crate::cleanup::run_cleanup(ctx, &playbook.env, &playbook.steps, frontier);
}

fn check_requirements(playbook: &Playbook, fs: &dyn Filesystem) -> Result<(), String> {
    for requirement in &playbook.preamble.requirements {
        if let Some(os) = &requirement.platform_os {
            if os != std::env::consts::OS {
                return Err(format!(
                    "platform_os {os:?} does not match running OS {:?}",
                    std::env::consts::OS
                ));
            }
        }
        if let Some(arch) = &requirement.platform_arch {
            if arch != std::env::consts::ARCH {
                return Err(format!(
                    "platform_arch {arch:?} does not match running arch {:?}",
                    std::env::consts::ARCH
                ));
            }
        }
        if let Some(path) = &requirement.file_exists {
            if !fs.exists(path) {
                return Err(format!("required file does not exist: {}", path.display()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
