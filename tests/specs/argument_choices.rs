//! Scenario 5: argument choices.
//!
//! A declared argument restricted to a fixed set of choices rejects an
//! out-of-set caller value before any step runs, and accepts an in-set
//! value.

use ttp_playbook::LoadError;

const RUNBOOK: &str = r#"
name: mode-gated
args:
  - name: mode
    choices: ["safe", "loud"]
steps:
  - name: announce
    print_str: "running in {{.Args.mode}} mode"
"#;

#[test]
fn a_value_outside_the_declared_choices_is_rejected_before_any_step_runs() {
    let supplied = [("mode".to_string(), "reckless".to_string())].into_iter().collect();

    let result = ttp_playbook::load(RUNBOOK, &supplied);

    match result {
        Err(LoadError::Validation(ttp_playbook::ValidationError::NotInChoices { name, value, .. })) => {
            assert_eq!(name, "mode");
            assert_eq!(value, "reckless");
        }
        other => panic!("expected a NotInChoices validation error, got {other:?}"),
    }
}

#[test]
fn a_value_inside_the_declared_choices_loads_and_resolves() {
    let supplied = [("mode".to_string(), "loud".to_string())].into_iter().collect();

    let (_playbook, resolved) = ttp_playbook::load(RUNBOOK, &supplied).expect("in-choice value should load");
    assert_eq!(resolved.get("mode").map(String::as_str), Some("loud"));
}
