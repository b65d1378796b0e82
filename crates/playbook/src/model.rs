// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The typed playbook document model.
//!
//! These types are pure data plus *structural* `validate()` checks — the
//! ones that need no runtime context (non-empty names, compiled regexes,
//! unique step names). Argument resolution against caller-supplied values
//! and cross-step name validation live in [`crate::loader`], which has the
//! bindings to check them against.

use std::collections::HashMap;
use std::path::PathBuf;

use regex::Regex;
use serde::{Deserialize, Deserializer};

use ttp_core::ArgDecl;

use crate::error::ValidationError;

/// A declared platform/file-presence precondition, checked by the
/// orchestrator before any step runs.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Requirement {
    #[serde(default)]
    pub platform_os: Option<String>,
    #[serde(default)]
    pub platform_arch: Option<String>,
    #[serde(default)]
    pub file_exists: Option<PathBuf>,
}

/// MITRE ATT&CK metadata. Inert descriptive data, carried through
/// unvalidated and unused by the engine.
pub type MitreMeta = serde_yaml::Value;

/// The playbook's header: name, description, declared arguments,
/// requirements, and MITRE metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Preamble {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<ArgDecl>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub mitre: Option<MitreMeta>,
}

/// A single edit applied to a file by `edit_file`. Edits apply in declared order, each over the
/// then-current contents.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum EditOp {
    /// Adds a single line with a trailing newline.
    Append { line: String },
    /// Removes all matches (regexp) or all literal occurrences.
    Delete {
        pattern: String,
        #[serde(default)]
        regexp: bool,
    },
    Replace {
        pattern: String,
        replacement: String,
        #[serde(default)]
        regexp: bool,
    },
}

impl EditOp {
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        match self {
            EditOp::Delete { pattern, regexp } | EditOp::Replace { pattern, regexp, .. }
                if *regexp =>
            {
                Regex::new(pattern).map_err(|e| ValidationError::InvalidRegex {
                    pattern: pattern.clone(),
                    source: e.to_string(),
                })?;
                Ok(())
            }
            EditOp::Append { line } if line.is_empty() => Ok(()),
            _ => Ok(()),
        }
    }
}

/// A post-execution assertion. A failing
/// check causes the step to be reported as `check_failed` even though
/// `Execute` returned ok.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case", deny_unknown_fields)]
pub enum SuccessCheck {
    FileExists { path: PathBuf },
    FileContainsString { path: PathBuf, substring: String },
    CommandSucceeds { cmd: String },
}

/// Extracts a named field from a step's stdout into `ActionResult.outputs`.
/// `json_path` is a dotted path evaluated against the stdout parsed as
/// JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputFilter {
    pub name: String,
    pub json_path: String,
}

/// The closed set of action variants. The discriminator is
/// whichever one selector key is present on the step map; the loader
/// enforces "exactly one".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum Action {
    Shell {
        cmd: String,
    },
    CreateFile {
        path: PathBuf,
        contents: String,
        #[serde(default)]
        overwrite: bool,
    },
    EditFile {
        path: PathBuf,
        edits: Vec<EditOp>,
    },
    CopyPath {
        src: PathBuf,
        dest: PathBuf,
    },
    RemovePath {
        path: PathBuf,
        #[serde(default)]
        recursive: bool,
    },
    FetchUri {
        uri: String,
        dest: PathBuf,
    },
    PrintStr(String),
    SubTtp {
        path: PathBuf,
        #[serde(default)]
        args: HashMap<String, String>,
    },
}

impl Action {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Action::Shell { .. } => "shell",
            Action::CreateFile { .. } => "create_file",
            Action::EditFile { .. } => "edit_file",
            Action::CopyPath { .. } => "copy_path",
            Action::RemovePath { .. } => "remove_path",
            Action::FetchUri { .. } => "fetch_uri",
            Action::PrintStr(_) => "print_str",
            Action::SubTtp { .. } => "sub_ttp",
        }
    }

    /// Static, context-free structural checks. Never executes a side effect.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Action::Shell { cmd } if cmd.trim().is_empty() => {
                Err(ValidationError::EmptyField("shell.cmd".to_string()))
            }
            Action::CreateFile { path, .. } if path.as_os_str().is_empty() => {
                Err(ValidationError::EmptyField("create_file.path".to_string()))
            }
            Action::EditFile { path, edits } => {
                if path.as_os_str().is_empty() {
                    return Err(ValidationError::EmptyField("edit_file.path".to_string()));
                }
                if edits.is_empty() {
                    return Err(ValidationError::EmptyField("edit_file.edits".to_string()));
                }
                for edit in edits {
                    edit.validate()?;
                }
                Ok(())
            }
            Action::CopyPath { src, dest } => {
                if src.as_os_str().is_empty() || dest.as_os_str().is_empty() {
                    return Err(ValidationError::EmptyField("copy_path.src/dest".to_string()));
                }
                Ok(())
            }
            Action::RemovePath { path, .. } if path.as_os_str().is_empty() => {
                Err(ValidationError::EmptyField("remove_path.path".to_string()))
            }
            Action::FetchUri { uri, dest } => {
                if uri.trim().is_empty() || dest.as_os_str().is_empty() {
                    return Err(ValidationError::EmptyField("fetch_uri.uri/dest".to_string()));
                }
                Ok(())
            }
            Action::SubTtp { path, .. } if path.as_os_str().is_empty() => {
                Err(ValidationError::EmptyField("sub_ttp.path".to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Whether partial progress from this action's `Execute` may have left
    /// side effects even if it returned an error.
    /// Only sub-playbooks may have already committed nested side effects
    /// before failing.
    pub fn should_cleanup_on_failure(&self) -> bool {
        matches!(self, Action::SubTtp { .. })
    }
}

/// The `cleanup` key's value: the literal token `"default"` (use the
/// action's own inverse) or an inline action to run instead. These two
/// shapes are mutually exclusive by construction of a single field — a
/// document that supplies neither is a decode error.
#[derive(Debug, Clone)]
pub enum CleanupSpec {
    NaturalInverse,
    Inline(Action),
}

impl Default for CleanupSpec {
    fn default() -> Self {
        CleanupSpec::NaturalInverse
    }
}

impl<'de> Deserialize<'de> for CleanupSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Token(String),
            Inline(Action),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Token(token) if token == "default" => Ok(CleanupSpec::NaturalInverse),
            Raw::Token(other) => Err(serde::de::Error::custom(format!(
                "unrecognized cleanup token {other:?}, expected \"default\" or an inline action"
            ))),
            Raw::Inline(action) => Ok(CleanupSpec::Inline(action)),
        }
    }
}

/// A named, one-action unit of work. `deny_unknown_fields`
/// is not set here because it cannot combine with `flatten` (serde
/// restriction) — extra keys are still rejected because the flattened
/// `Action` requires exactly one recognized selector key in the
/// remaining map.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub name: String,
    #[serde(flatten)]
    pub action: Action,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub cleanup: CleanupSpec,
    #[serde(default)]
    pub success_checks: Vec<SuccessCheck>,
    #[serde(default)]
    pub chdir: Option<PathBuf>,
    #[serde(default)]
    pub outputs: Vec<OutputFilter>,
    /// Raw template expression, re-expanded in phase (b); a falsy result
    /// skips the step without recording a cleanup candidate.
    #[serde(default, rename = "if")]
    pub if_cond: Option<String>,
}

impl Step {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("step.name".to_string()));
        }
        self.action.validate()?;
        if let CleanupSpec::Inline(action) = &self.cleanup {
            action.validate()?;
        }
        Ok(())
    }
}

/// A fully decoded, validated playbook. `work_dir` is
/// `None` until the orchestrator sets it — it is not part of the document.
// `deny_unknown_fields` cannot be combined with `flatten` (serde
// restriction); unknown preamble fields are still rejected because
// `Preamble` itself denies them.
#[derive(Debug, Clone, Deserialize)]
pub struct Playbook {
    #[serde(flatten)]
    pub preamble: Preamble,
    #[serde(default)]
    pub env: HashMap<String, String>,
    pub steps: Vec<Step>,
    #[serde(skip)]
    pub work_dir: Option<PathBuf>,
}

impl Playbook {
    /// Structural checks that need no caller-supplied bindings: unique,
    /// non-empty step names, and each step's own `validate()`.
    pub fn validate_structure(&self) -> Result<(), ValidationError> {
        let mut seen = std::collections::HashSet::new();
        for step in &self.steps {
            step.validate()?;
            if !seen.insert(step.name.as_str()) {
                return Err(ValidationError::DuplicateStepName(step.name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
