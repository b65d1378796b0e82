//! Scenario 1: a linear three-step run.
//!
//! Three dependent steps run in order, each succeeds, each's success
//! check passes, and the run's unconditional cleanup phase reverses all
//! three afterwards.

use crate::prelude::*;

const RUNBOOK: &str = r#"
name: linear
steps:
  - name: stage
    create_file:
      path: "/work/payload"
      contents: "stage one"
    success_checks:
      - check: file_exists
        path: "/work/payload"

  - name: annotate
    edit_file:
      path: "/work/payload"
      edits:
        - op: append
          line: "stage two"
    success_checks:
      - check: file_contains_string
        path: "/work/payload"
        substring: "stage two"

  - name: report
    print_str: "payload staged, original contents were {{.Steps.stage.stdout}}"
"#;

#[test]
fn three_dependent_steps_run_in_order_and_all_cleanup_afterwards() {
    let fs = fresh_fs();
    let result = run(&fs, RUNBOOK, &[]);

    assert!(result.error.is_none(), "run should succeed: {:?}", result.error);
    let ctx = result.ctx.expect("successful run should carry a context");

    assert_eq!(ctx.results.len(), 3);
    assert_eq!(ctx.results.by_name("stage").unwrap().index, 0);
    assert_eq!(ctx.results.by_name("annotate").unwrap().index, 1);
    assert_eq!(ctx.results.by_name("report").unwrap().index, 2);

    for outcome in ctx.results.iter() {
        assert_eq!(outcome.state, ttp_core::StepState::Succeeded);
        assert!(outcome.cleanup.is_some(), "{} should have been cleaned up", outcome.step_name);
    }

    // annotate's cleanup restores the pre-edit contents, then stage's
    // cleanup removes the file entirely — nothing left behind.
    assert!(!fs.contains(&path("/work/payload")));
}
