// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RAII working-directory guard, used by the Orchestrator for a playbook's
//! own `work_dir` and by the Step Runner for a step's `chdir` override.
//!
//! Restoration on [`Drop`] is best-effort: a failure to restore the prior
//! directory is logged, never panics.

use std::io;
use std::path::{Path, PathBuf};

pub struct WorkdirGuard {
    previous: PathBuf,
}

impl WorkdirGuard {
    /// Changes the process's current directory to `path`, returning a
    /// guard that restores the previous directory on drop.
    pub fn enter(path: &Path) -> io::Result<Self> {
        let previous = std::env::current_dir()?;
        std::env::set_current_dir(path)?;
        Ok(Self { previous })
    }
}

impl Drop for WorkdirGuard {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.previous) {
            tracing::warn!(
                path = %self.previous.display(),
                error = %e,
                "failed to restore working directory"
            );
        }
    }
}

#[cfg(test)]
#[path = "workdir_tests.rs"]
mod tests;
