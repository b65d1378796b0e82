//! Scenario 4: edit-file append + delete + regexp, then reversal.

use crate::prelude::*;

const RUNBOOK: &str = r#"
name: edit-file
steps:
  - name: edit
    edit_file:
      path: "/etc/hosts.local"
      edits:
        - op: append
          line: "10.0.0.9 beacon"
        - op: delete
          pattern: "9.9.9.9 legacy"
        - op: replace
          pattern: "(?m)^10\\.0\\.0\\.\\d+ .*$"
          replacement: "REDACTED"
          regexp: true
    success_checks:
      - check: file_contains_string
        path: "/etc/hosts.local"
        substring: "REDACTED"
"#;

const ORIGINAL: &str = "127.0.0.1 localhost\n9.9.9.9 legacy\n";

#[test]
fn ordered_edits_apply_over_then_current_contents_and_reverse_cleanly() {
    let fs = fresh_fs();
    fs.seed_file("/etc/hosts.local", ORIGINAL);

    let result = run(&fs, RUNBOOK, &[]);
    assert!(result.error.is_none(), "run should succeed: {:?}", result.error);

    // Cleanup restores the exact pre-edit contents, byte for byte.
    assert_eq!(fs.read(&path("/etc/hosts.local")).as_deref(), Some(ORIGINAL));
}

#[test]
fn edits_apply_in_declared_order_over_the_running_result() {
    let fs = fresh_fs();
    fs.seed_file("/etc/hosts.local", ORIGINAL);

    let result = run_with(
        &fs,
        RUNBOOK,
        &[],
        ttp_core::ExecutionConfig::new().with_no_cleanup(true),
    );
    assert!(result.error.is_none(), "run should succeed: {:?}", result.error);

    let contents = fs.read(&path("/etc/hosts.local")).expect("file should exist");
    // The appended beacon line was itself matched and redacted by the
    // regexp replace that ran after it — proves edits chain, not parallel.
    assert!(contents.contains("REDACTED"));
    assert!(!contents.contains("9.9.9.9 legacy"));
    assert!(!contents.contains("10.0.0.9 beacon"));
    assert!(contents.contains("127.0.0.1 localhost"));
}
