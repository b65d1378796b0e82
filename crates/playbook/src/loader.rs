// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Playbook loading: argument resolution, template expansion, and
//! structural decode.
//!
//! Loading a document from raw text to a validated [`Playbook`] happens in
//! four passes:
//!
//! 1. A raw, untemplated decode of just the preamble's `args:` list — the
//!    argument declarations are schema, not templated content, so they can
//!    be read before any argument values exist to expand against.
//! 2. **Argument resolution**: declared args are resolved
//!    against caller-supplied values (choices, coercion, defaults).
//! 3. **Phase (a) template expansion**: the resolved argument
//!    bindings are used to expand the *entire* raw document textually.
//! 4. A full decode of the expanded text into [`Playbook`], followed by
//!    [`Playbook::validate_structure`].

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use ttp_core::{coerce_bool, coerce_int, coerce_path, ArgDecl, ArgType};

use crate::error::{LoadError, ValidationError};
use crate::model::Playbook;
use crate::template::{expand, Bindings};

#[derive(Debug, Deserialize)]
struct PreambleArgsOnly {
    #[serde(default)]
    args: Vec<ArgDecl>,
}

/// Resolve declared arguments against caller-supplied values. Returns the resolved string bindings
/// used for template expansion; type coercion is re-validated here (even
/// though the bound value stays a string) so type errors surface before
/// any step runs.
pub fn resolve_arguments(
    declared: &[ArgDecl],
    supplied: &HashMap<String, String>,
) -> Result<HashMap<String, String>, ValidationError> {
    let declared_names: std::collections::HashSet<&str> =
        declared.iter().map(|d| d.name.as_str()).collect();
    for name in supplied.keys() {
        if !declared_names.contains(name.as_str()) {
            return Err(ValidationError::UndeclaredArgument(name.clone()));
        }
    }

    let mut resolved = HashMap::with_capacity(declared.len());
    for decl in declared {
        let value = match supplied.get(&decl.name) {
            Some(v) => v.clone(),
            None => match &decl.default {
                Some(default) => default.clone(),
                None => return Err(ValidationError::MissingRequiredArgument(decl.name.clone())),
            },
        };

        if let Some(choices) = &decl.choices {
            if !choices.contains(&value) {
                return Err(ValidationError::NotInChoices {
                    name: decl.name.clone(),
                    choices: choices.clone(),
                    value,
                });
            }
        }

        let value = match decl.ty {
            Some(ArgType::Bool) => coerce_bool(&value)
                .map(|b| b.to_string())
                .map_err(|source| ValidationError::ArgumentCoercion {
                    name: decl.name.clone(),
                    source,
                })?,
            Some(ArgType::Int) => coerce_int(&value)
                .map(|i| i.to_string())
                .map_err(|source| ValidationError::ArgumentCoercion {
                    name: decl.name.clone(),
                    source,
                })?,
            Some(ArgType::Path) => coerce_path(&value).display().to_string(),
            Some(ArgType::String) | None => value,
        };

        resolved.insert(decl.name.clone(), value);
    }
    Ok(resolved)
}

/// Load and validate a playbook document from raw (pre-template) text
/// and caller-supplied argument values.
///
/// Returns the validated [`Playbook`] and the resolved argument bindings
/// (needed again by the Step Runner for phase (b) per-step re-expansion).
pub fn load(
    raw_text: &str,
    supplied_args: &HashMap<String, String>,
) -> Result<(Playbook, HashMap<String, String>), LoadError> {
    let preamble_args: PreambleArgsOnly = serde_yaml::from_str(raw_text)?;
    let resolved_args = resolve_arguments(&preamble_args.args, supplied_args)?;

    debug!(count = resolved_args.len(), "resolved playbook arguments");

    let bindings = Bindings::args_only(resolved_args.clone());
    let expanded = expand(raw_text, &bindings)?;

    let playbook: Playbook = serde_yaml::from_str(&expanded)?;
    playbook.validate_structure()?;

    Ok((playbook, resolved_args))
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
