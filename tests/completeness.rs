use guardcheck::{
    check_guards_complete, Analyzer, AnalyzerConfig, CheckCompletenessRequest, CompareOp,
    CompletenessVerdict, EfsmVariable, FieldCondition, Guard,
};

#[test]
fn complementary_guards_cover_integers() {
    let verdict = check_guards_complete(&[Guard::manual("x > 0"), Guard::manual("x <= 0")], &[]);
    assert_eq!(verdict, CompletenessVerdict::complete());
}

#[test]
fn gap_inside_declared_bounds() {
    let verdict = check_guards_complete(
        &[Guard::manual("x > 0")],
        &[EfsmVariable::int("x", Some(-10), Some(10))],
    );
    assert!(!verdict.complete);
    assert_eq!(verdict.gap_model.as_deref(), Some("[x = 0]"));
    assert!(verdict.error.is_none());
}

#[test]
fn bounds_can_close_a_gap() {
    let verdict = check_guards_complete(
        &[Guard::manual("x > 0")],
        &[EfsmVariable::int("x", Some(1), Some(10))],
    );
    assert!(verdict.complete);

    let verdict = check_guards_complete(
        &[Guard::manual("x < 3"), Guard::manual("x > 5")],
        &[EfsmVariable::int("x", Some(0), None)],
    );
    assert_eq!(verdict.gap_model.as_deref(), Some("[x = 3]"));
}

#[test]
fn unbounded_gap() {
    let verdict = check_guards_complete(&[Guard::manual("x > 0")], &[]);
    assert_eq!(verdict.gap_model.as_deref(), Some("[x = 0]"));
}

#[test]
fn degenerate_sets_are_complete() {
    assert_eq!(check_guards_complete(&[], &[]), CompletenessVerdict::complete());
    assert_eq!(
        check_guards_complete(&[Guard::AlwaysTrue], &[]),
        CompletenessVerdict::complete()
    );
    assert_eq!(
        check_guards_complete(&[Guard::manual("   ")], &[]),
        CompletenessVerdict::complete()
    );
    // a malformed domain is never inspected when no solving is needed
    assert_eq!(
        check_guards_complete(
            &[Guard::AlwaysTrue],
            &[EfsmVariable::int("x", Some(5), Some(1))]
        ),
        CompletenessVerdict::complete()
    );
}

#[test]
fn always_true_among_others_is_complete() {
    let verdict = check_guards_complete(
        &[Guard::manual("x == 1"), Guard::AlwaysTrue],
        &[EfsmVariable::int("x", Some(0), Some(3))],
    );
    assert!(verdict.complete);
}

#[test]
fn bool_domain() {
    let flag = EfsmVariable::boolean("ack");
    let verdict = check_guards_complete(&[Guard::manual("ack == true")], &[flag.clone()]);
    assert_eq!(verdict.gap_model.as_deref(), Some("[ack = 0]"));

    let verdict = check_guards_complete(
        &[Guard::manual("ack == true"), Guard::manual("ack == false")],
        &[flag],
    );
    assert!(verdict.complete);
}

#[test]
fn enum_domain() {
    let mode = EfsmVariable::enumeration("mode", &["idle", "sync", "error"]);
    let verdict = check_guards_complete(
        &[Guard::manual("mode == 0"), Guard::manual("mode == 1")],
        &[mode.clone()],
    );
    assert_eq!(verdict.gap_model.as_deref(), Some("[mode = 2]"));

    let verdict = check_guards_complete(
        &[
            Guard::manual("mode == 0"),
            Guard::manual("mode == 1"),
            Guard::manual("mode == 2"),
        ],
        &[mode],
    );
    assert!(verdict.complete);
}

#[test]
fn declared_but_unused_variable_appears_in_gap() {
    let verdict = check_guards_complete(
        &[Guard::manual("x > 0")],
        &[EfsmVariable::int("y", Some(1), Some(3))],
    );
    assert_eq!(verdict.gap_model.as_deref(), Some("[x = 0, y = 1]"));
}

#[test]
fn protocol_guards_use_field_namespace() {
    let ok = Guard::protocol(vec![FieldCondition::new("rc", CompareOp::Eq, 0_i64)]);
    let err = Guard::protocol(vec![FieldCondition::new("rc", CompareOp::Neq, 0_i64)]);
    assert!(check_guards_complete(&[ok.clone(), err], &[]).complete);

    // a variable named "rc" does not bound the protocol field
    let verdict = check_guards_complete(&[ok], &[EfsmVariable::int("rc", Some(0), Some(0))]);
    assert!(!verdict.complete);
}

#[test]
fn inverted_bounds_fall_back_to_complete() {
    let verdict = check_guards_complete(
        &[Guard::manual("x > 0")],
        &[EfsmVariable::int("x", Some(3), Some(-3))],
    );
    assert!(verdict.complete);
    assert!(verdict.is_fallback());
    assert_eq!(verdict.gap_model, None);
}

#[test]
fn empty_enum_falls_back_to_complete() {
    let verdict = check_guards_complete(
        &[Guard::manual("mode == 0")],
        &[EfsmVariable::enumeration("mode", &[])],
    );
    assert!(verdict.complete);
    assert_eq!(
        verdict.error.as_deref(),
        Some("enum variable 'mode' declares no values")
    );
}

#[test]
fn strict_mode_error_falls_back_to_complete() {
    let strict = Analyzer::new(AnalyzerConfig::default().strict(true));
    let verdict = strict.check_guards_complete(&[Guard::manual("x => 1")], &[]);
    assert!(verdict.complete);
    assert!(verdict.is_fallback());
}

#[test]
fn adding_guards_only_closes_gaps() {
    let domain = [EfsmVariable::int("x", Some(0), Some(9))];
    let mut guards = vec![Guard::manual("x < 3")];
    assert!(!check_guards_complete(&guards, &domain).complete);
    guards.push(Guard::manual("x >= 3 && x < 7"));
    assert_eq!(
        check_guards_complete(&guards, &domain).gap_model.as_deref(),
        Some("[x = 7]")
    );
    guards.push(Guard::manual("x >= 7"));
    assert!(check_guards_complete(&guards, &domain).complete);
    guards.push(Guard::manual("x == 100"));
    assert!(check_guards_complete(&guards, &domain).complete);
}

#[test]
fn wire_request_with_labels() {
    let request: CheckCompletenessRequest = serde_json::from_str(
        r#"{
            "guards": [
                {"type": "manual", "manualExpression": "retries < 3"},
                {"type": "manual", "manualExpression": "retries >= 3"}
            ],
            "state": "Waiting",
            "event": "timeout",
            "variables": [{"name": "retries", "type": "int", "minValue": 0, "maxValue": 5}]
        }"#,
    )
    .unwrap();
    let verdict = Analyzer::default().check_completeness_request(&request);
    let json = serde_json::to_value(&verdict).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"complete": true, "gap_model": null, "error": null})
    );
}

#[test]
fn wire_request_without_variables() {
    let request: CheckCompletenessRequest = serde_json::from_str(
        r#"{"guards": [{"type": "manual", "manualExpression": "n != 4"}]}"#,
    )
    .unwrap();
    let verdict = Analyzer::default().check_completeness_request(&request);
    assert_eq!(verdict.gap_model.as_deref(), Some("[n = 4]"));
}
