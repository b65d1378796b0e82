// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template preprocessor.
//!
//! A small expression language expanded textually, before the document is
//! decoded: variable substitution (`{{.Args.X}}`,
//! `{{.Steps.NAME.stdout}}`), iteration (`{{range $v := EXPR}}...{{end}}`),
//! conditionals (`{{if EXPR}}...{{else}}...{{end}}`), and a fixed set of
//! string helpers, resolved in two namespaces (`Args`, `Steps`) across two
//! expansion phases.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),
    #[error("type mismatch in helper {helper}: {message}")]
    TypeMismatch { helper: String, message: String },
    #[error("unterminated expression starting at byte {0}")]
    UnterminatedExpression(usize),
    #[error("unknown helper: {0}")]
    UnknownHelper(String),
}

/// A resolved template value: either a scalar or a list (produced by
/// `splitList`, consumed by `range`/`joinList`).
#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Scalar(String),
    List(Vec<String>),
}

impl Value {
    fn into_scalar(self, helper: &str) -> Result<String, TemplateError> {
        match self {
            Value::Scalar(s) => Ok(s),
            Value::List(items) => Err(TemplateError::TypeMismatch {
                helper: helper.to_string(),
                message: format!("expected a scalar, got a list of {} items", items.len()),
            }),
        }
    }

    fn into_list(self, helper: &str) -> Result<Vec<String>, TemplateError> {
        match self {
            Value::List(items) => Ok(items),
            Value::Scalar(s) => Err(TemplateError::TypeMismatch {
                helper: helper.to_string(),
                message: format!("expected a list, got scalar {s:?}"),
            }),
        }
    }
}

/// The variable bindings available to a template expansion pass.
///
/// Phase (a) (whole-document) constructs a `Bindings` with only
/// `args` populated. Phase (b) (per-step, just before each step runs)
/// additionally populates `steps` with the results of already-executed
/// steps.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    pub args: HashMap<String, String>,
    /// Flattened as produced by `StepResultsRecord::all_template_bindings`:
    /// keys already in `Steps.NAME.field` form.
    pub steps: HashMap<String, String>,
    /// Phase (a) (whole-document expansion) hasn't run any
    /// steps yet, so a bare `.Steps....` reference isn't an error — it is
    /// left untouched, verbatim, for phase (b) to resolve once the
    /// referenced step has actually executed.
    defer_step_refs: bool,
}

impl Bindings {
    /// Phase (a): whole-document expansion with only argument bindings.
    /// `.Steps....` references are passed through unexpanded.
    pub fn args_only(args: HashMap<String, String>) -> Self {
        Self {
            args,
            steps: HashMap::new(),
            defer_step_refs: true,
        }
    }

    /// Phase (b): per-step re-expansion with accumulated step results.
    /// A `.Steps....` reference to a step that hasn't run is now a real
    /// undefined-variable error.
    pub fn with_steps(args: HashMap<String, String>, steps: HashMap<String, String>) -> Self {
        Self {
            args,
            steps,
            defer_step_refs: false,
        }
    }
}

/// Local loop-variable scope, chained for nested `range` blocks.
#[derive(Debug, Clone, Default)]
struct Scope<'a> {
    parent: Option<&'a Scope<'a>>,
    vars: HashMap<String, String>,
}

impl<'a> Scope<'a> {
    fn lookup(&self, name: &str) -> Option<&str> {
        if let Some(v) = self.vars.get(name) {
            return Some(v.as_str());
        }
        self.parent.and_then(|p| p.lookup(name))
    }

    fn child(&'a self, name: String, value: String) -> Scope<'a> {
        let mut vars = HashMap::new();
        vars.insert(name, value);
        Scope {
            parent: Some(self),
            vars,
        }
    }
}

/// Expand all `{{...}}` template tags in `input` against `bindings`.
///
/// Expansion is deterministic: the same input and bindings always produce
/// byte-identical output.
pub fn expand(input: &str, bindings: &Bindings) -> Result<String, TemplateError> {
    let scope = Scope::default();
    expand_scoped(input, bindings, &scope)
}

fn expand_scoped(input: &str, bindings: &Bindings, scope: &Scope) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let tag_len = after_open
            .find("}}")
            .ok_or(TemplateError::UnterminatedExpression(start))?;
        let tag = after_open[..tag_len].trim();

        if let Some(expr) = tag.strip_prefix("range ") {
            let (var_name, list_expr) = parse_range_header(expr.trim())?;
            let after_tag = &after_open[tag_len + 2..];
            let (body, remainder) = take_block(after_tag)?;
            let list = eval_pipeline(list_expr.trim(), bindings, scope)?.into_list("range")?;
            for item in list {
                let child = scope.child(var_name.clone(), item);
                out.push_str(&expand_scoped(body, bindings, &child)?);
            }
            rest = remainder;
            continue;
        }

        if let Some(expr) = tag.strip_prefix("if ") {
            let after_tag = &after_open[tag_len + 2..];
            let (body, remainder) = take_block(after_tag)?;
            let (then_part, else_part) = split_else(body);
            let cond = eval_pipeline(expr.trim(), bindings, scope)?.into_scalar("if")?;
            if is_truthy(&cond) {
                out.push_str(&expand_scoped(then_part, bindings, scope)?);
            } else if let Some(else_body) = else_part {
                out.push_str(&expand_scoped(else_body, bindings, scope)?);
            }
            rest = remainder;
            continue;
        }

        // Phase (a) hasn't run any steps yet: leave bare `.Steps...` refs
        // verbatim for phase (b) to resolve later.
        if bindings.defer_step_refs && tag.starts_with(".Steps.") && !tag.contains('|') {
            out.push_str("{{");
            out.push_str(tag);
            out.push_str("}}");
            rest = &after_open[tag_len + 2..];
            continue;
        }

        // Plain value expression.
        let value = eval_pipeline(tag, bindings, scope)?.into_scalar(tag)?;
        out.push_str(&value);
        rest = &after_open[tag_len + 2..];
    }

    out.push_str(rest);
    Ok(out)
}

fn is_truthy(s: &str) -> bool {
    !s.is_empty() && s != "false" && s != "0"
}

/// Split `range $v := EXPR` into the loop variable name and the list
/// expression.
fn parse_range_header(header: &str) -> Result<(String, &str), TemplateError> {
    let without_var = header
        .strip_prefix('$')
        .ok_or_else(|| TemplateError::UnterminatedExpression(0))?;
    let (var, rest) = without_var
        .split_once(":=")
        .ok_or_else(|| TemplateError::UnterminatedExpression(0))?;
    Ok((var.trim().to_string(), rest.trim()))
}

/// Find the body up to the matching `{{end}}`, honoring nested
/// `{{range ...}}`/`{{if ...}}` blocks. Returns the body and the text
/// following the matching `{{end}}`.
fn take_block(input: &str) -> Result<(&str, &str), TemplateError> {
    let mut depth = 1i32;
    let mut search_from = 0usize;
    loop {
        let rel = input[search_from..]
            .find("{{")
            .ok_or(TemplateError::UnterminatedExpression(search_from))?;
        let tag_start = search_from + rel + 2;
        let tag_end = input[tag_start..]
            .find("}}")
            .ok_or(TemplateError::UnterminatedExpression(tag_start))?;
        let tag = input[tag_start..tag_start + tag_end].trim();

        if tag.starts_with("range ") || tag.starts_with("if ") {
            depth += 1;
        } else if tag == "end" {
            depth -= 1;
            if depth == 0 {
                let body_end = search_from + rel;
                let after = &input[tag_start + tag_end + 2..];
                return Ok((&input[..body_end], after));
            }
        }
        search_from = tag_start + tag_end + 2;
    }
}

/// Split an `{{if}}` body on a top-level `{{else}}` (not nested inside
/// another if/range).
fn split_else(body: &str) -> (&str, Option<&str>) {
    let mut depth = 0i32;
    let mut search_from = 0usize;
    while let Some(rel) = body[search_from..].find("{{") {
        let tag_start = search_from + rel + 2;
        let Some(tag_end) = body[tag_start..].find("}}") else {
            break;
        };
        let tag = body[tag_start..tag_start + tag_end].trim();
        if tag.starts_with("range ") || tag.starts_with("if ") {
            depth += 1;
        } else if tag == "end" {
            depth -= 1;
        } else if tag == "else" && depth == 0 {
            let then_part = &body[..search_from + rel];
            let else_part = &body[tag_start + tag_end + 2..];
            return (then_part, Some(else_part));
        }
        search_from = tag_start + tag_end + 2;
    }
    (body, None)
}

/// Evaluate a pipeline: `EXPR | helper arg... | helper arg...`.
fn eval_pipeline(expr: &str, bindings: &Bindings, scope: &Scope) -> Result<Value, TemplateError> {
    let mut segments = split_top_level_pipe(expr);
    let first = segments.remove(0);
    let mut value = eval_term(first.trim(), bindings, scope)?;
    for segment in segments {
        value = eval_call(segment.trim(), bindings, scope, Some(value))?;
    }
    Ok(value)
}

fn split_top_level_pipe(expr: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth_quote = false;
    let mut start = 0usize;
    let bytes = expr.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'"' => depth_quote = !depth_quote,
            b'|' if !depth_quote => {
                parts.push(&expr[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&expr[start..]);
    parts
}

/// Evaluate a single term: a string literal, a dotted path, a `$var`, or a
/// bare function call (`helper arg1 arg2`).
fn eval_term(term: &str, bindings: &Bindings, scope: &Scope) -> Result<Value, TemplateError> {
    if term.starts_with('.') || term.starts_with('$') {
        return eval_path(term, bindings, scope);
    }
    if term.starts_with('"') {
        return Ok(Value::Scalar(parse_string_literal(term)?));
    }
    eval_call(term, bindings, scope, None)
}

/// Evaluate `helper arg1 arg2 ...`, optionally with a piped-in value
/// appended as the final argument (Go-template pipe convention).
fn eval_call(
    call: &str,
    bindings: &Bindings,
    scope: &Scope,
    piped: Option<Value>,
) -> Result<Value, TemplateError> {
    let tokens = tokenize_args(call);
    let (name, arg_tokens) = tokens
        .split_first()
        .ok_or_else(|| TemplateError::UnknownHelper(call.to_string()))?;

    let mut args = Vec::with_capacity(arg_tokens.len() + 1);
    for token in arg_tokens {
        args.push(eval_term(token, bindings, scope)?);
    }
    if let Some(value) = piped {
        args.push(value);
    }

    call_helper(name, args)
}

fn call_helper(name: &str, mut args: Vec<Value>) -> Result<Value, TemplateError> {
    match name {
        "splitList" => {
            let value = args.pop().ok_or(arity_err("splitList"))?;
            let sep = args.pop().ok_or(arity_err("splitList"))?.into_scalar("splitList")?;
            let s = value.into_scalar("splitList")?;
            Ok(Value::List(
                s.split(sep.as_str()).map(|p| p.to_string()).collect(),
            ))
        }
        "joinList" => {
            let value = args.pop().ok_or(arity_err("joinList"))?;
            let sep = args.pop().ok_or(arity_err("joinList"))?.into_scalar("joinList")?;
            let list = value.into_list("joinList")?;
            Ok(Value::Scalar(list.join(&sep)))
        }
        "trim" => {
            let value = args.pop().ok_or(arity_err("trim"))?.into_scalar("trim")?;
            Ok(Value::Scalar(value.trim().to_string()))
        }
        "lower" => {
            let value = args.pop().ok_or(arity_err("lower"))?.into_scalar("lower")?;
            Ok(Value::Scalar(value.to_lowercase()))
        }
        "upper" => {
            let value = args.pop().ok_or(arity_err("upper"))?.into_scalar("upper")?;
            Ok(Value::Scalar(value.to_uppercase()))
        }
        "contains" => {
            let haystack = args.pop().ok_or(arity_err("contains"))?.into_scalar("contains")?;
            let needle = args.pop().ok_or(arity_err("contains"))?.into_scalar("contains")?;
            Ok(Value::Scalar(haystack.contains(&needle).to_string()))
        }
        "default" => {
            let value = args.pop().ok_or(arity_err("default"))?.into_scalar("default")?;
            let fallback = args.pop().ok_or(arity_err("default"))?.into_scalar("default")?;
            Ok(Value::Scalar(if value.is_empty() { fallback } else { value }))
        }
        other => Err(TemplateError::UnknownHelper(other.to_string())),
    }
}

fn arity_err(helper: &str) -> TemplateError {
    TemplateError::TypeMismatch {
        helper: helper.to_string(),
        message: "missing argument".to_string(),
    }
}

/// Resolve `.Args.NAME`, `.Steps.NAME.stdout`, `.Steps.NAME.stderr`,
/// `.Steps.NAME.outputs.FIELD`, or `$loopVar`.
fn eval_path(path: &str, bindings: &Bindings, scope: &Scope) -> Result<Value, TemplateError> {
    if let Some(var) = path.strip_prefix('$') {
        return scope
            .lookup(var)
            .map(|v| Value::Scalar(v.to_string()))
            .ok_or_else(|| TemplateError::UndefinedVariable(format!("${var}")));
    }

    let key = path.trim_start_matches('.');
    if let Some(name) = key.strip_prefix("Args.") {
        return bindings
            .args
            .get(name)
            .map(|v| Value::Scalar(v.clone()))
            .ok_or_else(|| TemplateError::UndefinedVariable(path.to_string()));
    }
    if key.starts_with("Steps.") {
        return bindings
            .steps
            .get(key)
            .map(|v| Value::Scalar(v.clone()))
            .ok_or_else(|| TemplateError::UndefinedVariable(path.to_string()));
    }
    Err(TemplateError::UndefinedVariable(path.to_string()))
}

fn parse_string_literal(token: &str) -> Result<String, TemplateError> {
    let inner = token
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| TemplateError::UnterminatedExpression(0))?;
    Ok(inner.to_string())
}

/// Split a function-call expression into whitespace-separated tokens,
/// keeping quoted strings intact.
fn tokenize_args(call: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let bytes = call.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        let start = i;
        if bytes[i] == b'"' {
            i += 1;
            while i < bytes.len() && bytes[i] != b'"' {
                i += 1;
            }
            i = (i + 1).min(bytes.len());
        } else {
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                i += 1;
            }
        }
        tokens.push(&call[start..i]);
    }
    tokens
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
