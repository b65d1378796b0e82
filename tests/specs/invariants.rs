//! Named invariants and property tests, beyond the six literal
//! end-to-end scenarios (each of which has its own file).

use std::collections::HashMap;
use std::sync::Arc;

use ttp_core::{coerce_bool, coerce_int, MemFilesystem, StepState};

use crate::prelude::*;

// =============================================================================
// Cleanup ordering: reverse of execution order
// =============================================================================

const ORDERING_RUNBOOK: &str = r#"
name: ordering
steps:
  - name: s0
    print_str: "s0"
    cleanup:
      print_str: "cleanup:s0"

  - name: s1
    print_str: "s1"
    cleanup:
      print_str: "cleanup:s1"

  - name: s2
    print_str: "s2"
    cleanup:
      print_str: "cleanup:s2"
"#;

#[test]
fn cleanup_walks_steps_in_the_exact_reverse_of_execution_order() {
    let fs = fresh_fs();
    let result = run(&fs, ORDERING_RUNBOOK, &[]);

    assert!(result.error.is_none(), "run should succeed: {:?}", result.error);
    let ctx = result.ctx.expect("successful run should carry a context");

    // Each step's inline cleanup override is itself an *executed* action,
    // so its own result is recorded as that step's `cleanup`, in the
    // order the Cleanup Controller actually ran them: s2, then s1, then s0.
    let order: Vec<&str> = (0..3)
        .rev()
        .map(|i| ctx.results.by_index(i).unwrap().cleanup.as_ref().unwrap().stdout.as_str())
        .collect();
    assert_eq!(order, vec!["cleanup:s2", "cleanup:s1", "cleanup:s0"]);
}

// =============================================================================
// Cleanup frontier: a success-check failure does not advance it
// =============================================================================

const CHECK_FAILURE_RUNBOOK: &str = r#"
name: check-failure
steps:
  - name: stage
    create_file:
      path: "/work/a"
      contents: "a"

  - name: half-done
    create_file:
      path: "/work/b"
      contents: "b"
    success_checks:
      - check: file_exists
        path: "/work/does-not-exist"
"#;

#[test]
fn a_success_check_failure_does_not_advance_the_cleanup_frontier() {
    let fs = fresh_fs();
    let result = run(&fs, CHECK_FAILURE_RUNBOOK, &[]);

    assert!(matches!(result.error, Some(ttp_engine::EngineError::CheckFailed { .. })));
    let ctx = result.ctx.expect("a partial run still carries its context");

    assert_eq!(
        ctx.results.by_name("half-done").unwrap().state,
        StepState::CheckFailed
    );
    assert!(
        ctx.results.by_name("half-done").unwrap().cleanup.is_none(),
        "a step excluded from the cleanup frontier must never be cleaned up"
    );
    // stage is still reversed: the frontier only ever reached index 0.
    assert!(!fs.contains(&path("/work/a")));
    // half-done's own create_file was never rolled back — it is outside
    // the cleanup frontier, exactly as a step that never ran would be.
    assert!(fs.contains(&path("/work/b")));
}

// =============================================================================
// Result dual-indexing: by_index and by_name agree
// =============================================================================

#[test]
fn by_index_and_by_name_resolve_to_the_same_recorded_outcome() {
    let fs = fresh_fs();
    let result = run(&fs, ORDERING_RUNBOOK, &[]);
    let ctx = result.ctx.expect("successful run should carry a context");

    for i in 0..ctx.results.len() {
        let by_idx = ctx.results.by_index(i).unwrap();
        let by_name = ctx.results.by_name(&by_idx.step_name).unwrap();
        assert_eq!(by_idx.index, by_name.index);
        assert_eq!(by_idx.step_name, by_name.step_name);
        assert_eq!(by_idx.state, by_name.state);
    }
}

// =============================================================================
// Template determinism: same input + bindings -> byte-identical output
// =============================================================================

#[test]
fn the_same_input_and_bindings_always_expand_identically() {
    let mut args = HashMap::new();
    args.insert("Target".to_string(), "10.0.0.1".to_string());
    let bindings = ttp_playbook::Bindings::args_only(args);

    let input = r#"host={{.Args.Target}}, upper={{.Args.Target | upper}}"#;
    let first = ttp_playbook::expand(input, &bindings).unwrap();
    let second = ttp_playbook::expand(input, &bindings).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, "host=10.0.0.1, upper=10.0.0.1");
}

// =============================================================================
// Argument coercion round-trip
// =============================================================================

#[test]
fn bool_arguments_accept_the_documented_case_insensitive_set() {
    for (raw, expected) in [
        ("true", true),
        ("TRUE", true),
        ("1", true),
        ("yes", true),
        ("false", false),
        ("FALSE", false),
        ("0", false),
        ("no", false),
    ] {
        assert_eq!(coerce_bool(raw).unwrap(), expected, "input {raw:?}");
    }
    assert!(coerce_bool("maybe").is_err());
}

#[test]
fn int_arguments_reject_non_integer_input() {
    assert_eq!(coerce_int("42").unwrap(), 42);
    assert_eq!(coerce_int("-7").unwrap(), -7);
    assert!(coerce_int("4.2").is_err());
    assert!(coerce_int("forty-two").is_err());
}

#[test]
fn path_arguments_resolve_to_an_absolute_path() {
    let resolved = ttp_core::coerce_path("relative/thing");
    assert!(resolved.is_absolute());
}

// =============================================================================
// No side effects on validation failure
// =============================================================================

const MISSING_REQUIRED_ARG_RUNBOOK: &str = r#"
name: needs-target
args:
  - name: target
steps:
  - name: stage
    create_file:
      path: "/work/a"
      contents: "a"
"#;

#[test]
fn a_document_missing_a_required_argument_never_loads_and_never_runs_a_step() {
    let fs = Arc::new(MemFilesystem::new());
    let supplied = HashMap::new();

    let outcome = ttp_playbook::load(MISSING_REQUIRED_ARG_RUNBOOK, &supplied);
    assert!(matches!(
        outcome,
        Err(ttp_playbook::LoadError::Validation(
            ttp_playbook::ValidationError::MissingRequiredArgument(_)
        ))
    ));
    assert!(!fs.contains(&path("/work/a")));
}

const BAD_SUB_TTP_REFERENCE_RUNBOOK: &str = r#"
name: bad-reference
steps:
  - name: create-first
    create_file:
      path: "/work/early"
      contents: "early"

  - name: nested
    sub_ttp:
      path: "/ttps/does-not-exist.yaml"
"#;

#[test]
fn an_unresolvable_sub_ttp_reference_blocks_every_step_including_earlier_ones() {
    let fs = fresh_fs();
    let result = run(&fs, BAD_SUB_TTP_REFERENCE_RUNBOOK, &[]);

    assert!(matches!(result.error, Some(ttp_engine::EngineError::Validation(_))));
    assert!(result.ctx.is_none());
    assert!(!fs.contains(&path("/work/early")));
}

// =============================================================================
// Edit-file reversibility: cleanup restores exact pre-edit bytes
// =============================================================================

#[test]
fn edit_file_cleanup_restores_byte_identical_pre_edit_contents() {
    let fs = fresh_fs();
    fs.seed_file("/etc/motd", "line one\nline two\n");

    let runbook = r#"
name: reversible-edit
steps:
  - name: edit
    edit_file:
      path: "/etc/motd"
      edits:
        - op: append
          line: "line three"
        - op: delete
          pattern: "line two"
"#;
    let result = run(&fs, runbook, &[]);
    assert!(result.error.is_none(), "run should succeed: {:?}", result.error);
    assert_eq!(fs.read(&path("/etc/motd")).as_deref(), Some("line one\nline two\n"));
}
