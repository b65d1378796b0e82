//! Scenario 6: looped template expansion.
//!
//! `{{range}}` over a `splitList`-derived list generates one step per
//! list element, textually, before the document is even decoded.

use crate::prelude::*;

const RUNBOOK: &str = r#"
name: fan-out
args:
  - name: hosts
steps:
{{range $host := splitList "," .Args.hosts}}
  - name: probe-{{$host}}
    print_str: "probing {{$host}}"
{{end}}
"#;

#[test]
fn range_over_a_split_argument_generates_one_step_per_element() {
    let fs = fresh_fs();
    let result = run(&fs, RUNBOOK, &[("hosts", "alpha,beta,gamma")]);

    assert!(result.error.is_none(), "run should succeed: {:?}", result.error);
    let ctx = result.ctx.expect("successful run should carry a context");

    assert_eq!(ctx.results.len(), 3);
    for host in ["alpha", "beta", "gamma"] {
        let outcome = ctx
            .results
            .by_name(&format!("probe-{host}"))
            .unwrap_or_else(|| panic!("missing generated step for {host}"));
        assert_eq!(outcome.state, ttp_core::StepState::Succeeded);
        assert_eq!(outcome.execute.as_ref().unwrap().stdout, format!("probing {host}"));
    }
}

#[test]
fn a_single_element_list_still_expands_through_the_same_loop() {
    let fs = fresh_fs();
    let result = run(&fs, RUNBOOK, &[("hosts", "solo")]);

    assert!(result.error.is_none(), "run should succeed: {:?}", result.error);
    let ctx = result.ctx.expect("successful run should carry a context");
    assert_eq!(ctx.results.len(), 1);
    assert!(ctx.results.by_name("probe-solo").is_some());
}

const NESTED_RUNBOOK: &str = r#"
name: looped
args:
  - name: first_list
    type: string
  - name: second_list
    type: string
steps:
{{range $a := splitList "," .Args.first_list}}
{{range $b := splitList "," .Args.second_list}}
  - name: combo_{{$a}}_{{$b}}
    print_str: "combo"
{{end}}
{{end}}
"#;

#[test]
fn nested_range_generates_and_runs_one_step_per_combination_in_order() {
    let fs = fresh_fs();
    let result = run(&fs, NESTED_RUNBOOK, &[("first_list", "a,b"), ("second_list", "c,d")]);

    assert!(result.error.is_none(), "run should succeed: {:?}", result.error);
    let ctx = result.ctx.expect("successful run should carry a context");

    assert_eq!(ctx.results.len(), 4);
    let names: Vec<&str> = (0..4)
        .map(|i| ctx.results.by_index(i).expect("step at index").step_name.as_str())
        .collect();
    assert_eq!(names, vec!["combo_a_c", "combo_a_d", "combo_b_c", "combo_b_d"]);

    for name in &names {
        let outcome = ctx.results.by_name(name).expect("named lookup matches index order");
        assert_eq!(outcome.state, ttp_core::StepState::Succeeded);
        assert_eq!(outcome.execute.as_ref().unwrap().stdout, "combo");
    }
}
