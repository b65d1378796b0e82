//! Scenario 3: cleanup of a failed sub-playbook.
//!
//! A `sub_ttp` step runs a nested playbook whose own steps partially
//! succeed before failing. The nested Cleanup Controller runs eagerly,
//! inline, inside the step's own `Execute` — by the time the outer run
//! reports its own failure, the nested side effects are already gone, and
//! the outer Cleanup Controller's call to the step's `Cleanup` is a no-op.

use crate::prelude::*;

const INNER_RUNBOOK: &str = r#"
name: inner
steps:
  - name: inner-stage
    create_file:
      path: "/tmp/inner-staged"
      contents: "staged"

  - name: inner-boom
    shell: "exit 3"
"#;

const OUTER_RUNBOOK: &str = r#"
name: outer
steps:
  - name: run-inner
    sub_ttp:
      path: "/ttps/inner.yaml"
"#;

#[test]
fn nested_failure_cleans_up_its_own_partial_progress_eagerly() {
    let fs = fresh_fs();
    fs.seed_file("/ttps/inner.yaml", INNER_RUNBOOK);

    let result = run(&fs, OUTER_RUNBOOK, &[]);

    let error = result.error.expect("outer run should fail");
    match error {
        ttp_engine::EngineError::Execution { step, .. } => assert_eq!(step, "run-inner"),
        other => panic!("expected an Execution error, got {other:?}"),
    }

    // The nested `create_file` never survives past the nested cleanup —
    // this already happened inside `execute`, not the outer run's own
    // cleanup phase.
    assert!(!fs.contains(&path("/tmp/inner-staged")));

    let ctx = result.ctx.expect("a partial run still carries its context");
    let outer_outcome = ctx.results.by_name("run-inner").expect("outer step should be recorded");
    assert_eq!(outer_outcome.state, ttp_core::StepState::ExecuteFailed);
}

const INNER_SUCCESS_RUNBOOK: &str = r#"
name: inner-ok
steps:
  - name: inner-stage
    create_file:
      path: "/tmp/inner-ok-staged"
      contents: "staged"
"#;

const OUTER_SUCCESS_RUNBOOK: &str = r#"
name: outer-ok
steps:
  - name: run-inner
    sub_ttp:
      path: "/ttps/inner-ok.yaml"

  - name: after
    print_str: "after sub_ttp"
"#;

#[test]
fn a_fully_successful_nested_run_defers_its_cleanup_to_the_outer_run() {
    let fs = fresh_fs();
    fs.seed_file("/ttps/inner-ok.yaml", INNER_SUCCESS_RUNBOOK);

    let result = run(&fs, OUTER_SUCCESS_RUNBOOK, &[]);

    assert!(result.error.is_none(), "run should succeed: {:?}", result.error);

    // By the time the outer run's own Cleanup Controller has finished,
    // the nested `create_file` has been reversed too.
    assert!(!fs.contains(&path("/tmp/inner-ok-staged")));
}
