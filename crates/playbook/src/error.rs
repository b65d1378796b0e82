// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The load/validation error taxonomy.

use thiserror::Error;

use ttp_core::CoerceError;

use crate::template::TemplateError;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("template expansion failed: {0}")]
    Template(#[from] TemplateError),
    #[error("document does not decode: {0}")]
    Decode(#[from] serde_yaml::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(String),
    #[error("duplicate step name: {0}")]
    DuplicateStepName(String),
    #[error("invalid regexp {pattern:?}: {source}")]
    InvalidRegex { pattern: String, source: String },
    #[error("undeclared argument: {0}")]
    UndeclaredArgument(String),
    #[error("missing required argument: {0}")]
    MissingRequiredArgument(String),
    #[error("argument {name:?} not in choices {choices:?}: got {value:?}")]
    NotInChoices {
        name: String,
        choices: Vec<String>,
        value: String,
    },
    #[error("argument {name:?} failed to coerce: {source}")]
    ArgumentCoercion { name: String, source: CoerceError },
}
