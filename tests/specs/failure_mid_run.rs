//! Scenario 2: failure mid-run.
//!
//! The second of three steps fails; only the steps that actually
//! succeeded before it are cleaned up, in reverse order, and the step
//! that never ran is absent from the results record entirely.

use crate::prelude::*;

const RUNBOOK: &str = r#"
name: mid-run-failure
steps:
  - name: stage
    create_file:
      path: "/work/a"
      contents: "a"

  - name: boom
    shell: "exit 7"

  - name: never-runs
    create_file:
      path: "/work/b"
      contents: "b"
"#;

#[test]
fn a_failing_step_stops_the_run_and_cleans_up_only_what_already_succeeded() {
    let fs = fresh_fs();
    let result = run(&fs, RUNBOOK, &[]);

    let error = result.error.expect("run should report the shell failure");
    match error {
        ttp_engine::EngineError::Execution { step, .. } => assert_eq!(step, "boom"),
        other => panic!("expected an Execution error, got {other:?}"),
    }

    let ctx = result.ctx.expect("a partial run still carries its context");
    assert_eq!(ctx.results.len(), 2, "the never-runs step must not be recorded at all");
    assert_eq!(ctx.results.by_name("stage").unwrap().state, ttp_core::StepState::Succeeded);
    assert_eq!(ctx.results.by_name("boom").unwrap().state, ttp_core::StepState::ExecuteFailed);
    assert!(ctx.results.by_name("never-runs").is_none());

    // stage's create_file was cleaned up (frontier stopped at index 0).
    assert!(!fs.contains(&path("/work/a")));
    assert!(!fs.contains(&path("/work/b")));
}
