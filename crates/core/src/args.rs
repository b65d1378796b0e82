// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Argument declarations and the closed set of semantic types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// The closed set of semantic argument types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    String,
    Int,
    Bool,
    Path,
}

/// A resolved argument value, typed according to its declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    String(String),
    Int(i64),
    Bool(bool),
    Path(PathBuf),
}

impl ArgValue {
    /// Render the value back to its template-substitutable string form.
    pub fn as_template_string(&self) -> String {
        match self {
            ArgValue::String(s) => s.clone(),
            ArgValue::Int(i) => i.to_string(),
            ArgValue::Bool(b) => b.to_string(),
            ArgValue::Path(p) => p.display().to_string(),
        }
    }
}

/// An argument declaration from a playbook preamble.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgDecl {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: Option<ArgType>,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub choices: Option<Vec<String>>,
}

/// Errors coercing a raw string argument value to its declared type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoerceError {
    #[error("invalid int value: {0}")]
    InvalidInt(String),
    #[error("invalid bool value: {0}")]
    InvalidBool(String),
}

/// Parse a boolean from the case-insensitive set {true, false, 1, 0, yes, no}.
pub fn coerce_bool(raw: &str) -> Result<bool, CoerceError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(CoerceError::InvalidBool(raw.to_string())),
    }
}

/// Parse a signed integer, rejecting anything that isn't a plain integer literal.
pub fn coerce_int(raw: &str) -> Result<i64, CoerceError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| CoerceError::InvalidInt(raw.to_string()))
}

/// Normalize a path argument: expand a leading `~`, then make it absolute
/// against the current working directory (paths need not exist yet, so
/// this does not use `fs::canonicalize`).
pub fn coerce_path(raw: &str) -> PathBuf {
    let expanded = if let Some(rest) = raw.strip_prefix("~/") {
        dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(raw))
    } else if raw == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(raw))
    } else {
        PathBuf::from(raw)
    };

    if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    }
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
