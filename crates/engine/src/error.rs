// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the execution engine.

use thiserror::Error;

use ttp_core::FsError;
use ttp_playbook::{LoadError, TemplateError};

/// Errors raised while an action performs its side effect or reverses it.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("filesystem error: {0}")]
    Fs(#[from] FsError),
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("command exited with status {status:?}: {stderr}")]
    NonZeroExit { status: Option<i32>, stderr: String },
    #[error("invalid regexp {pattern:?}: {message}")]
    InvalidRegex { pattern: String, message: String },
    #[error("http request failed: {0}")]
    Http(String),
    #[error("sub-playbook failed: {0}")]
    SubPlaybook(String),
    #[error("output filter {name:?}: {message}")]
    OutputFilter { name: String, message: String },
    #[error("success check failed: {0}")]
    CheckFailed(String),
}

/// The taxonomy returned to the caller of the engine.
///
/// Load and requirement errors are raised before any side effect.
/// Execution and check errors carry the run's partial `StepResultsRecord`
/// alongside them so the caller can inspect what happened before cleanup.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("load failed: {0}")]
    Load(#[from] LoadError),
    #[error("requirement not met: {0}")]
    Requirement(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("step {step:?} failed: {source}")]
    Execution { step: String, source: ActionError },
    #[error("step {step:?} success check failed: {message}")]
    CheckFailed { step: String, message: String },
}
