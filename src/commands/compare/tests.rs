use super::*;
use crate::model::fixtures::{category, snapshot};
use crate::model::SnapshotSummary;

fn with_default_categories(mut snapshot: Snapshot) -> Snapshot {
    snapshot.categories = vec![
        category("lots", 95.0, Some((19, 20))),
        category("rotations", 90.0, Some((27, 30))),
        category("nominal", 98.0, Some((49, 50))),
        category("high_version", 80.0, None),
    ];
    snapshot
}

fn reasons(evaluation: &GateEvaluation) -> Vec<String> {
    evaluation.verdict.reasons()
}

#[test]
fn identical_snapshots_pass_with_zero_drop_and_regression() {
    let baseline = with_default_categories(snapshot("abc", 92.0, 10.0));
    let candidate = baseline.clone();

    let evaluation = evaluate_gate(&baseline, &candidate, &GateThresholds::default());
    assert!(evaluation.verdict.passed);
    assert!(evaluation.verdict.violations.is_empty());

    let measurements = evaluation.measurements.expect("numeric checks should run");
    assert_eq!(measurements.rate_drop_pp, 0.0);
    assert_eq!(measurements.runtime_regression, RuntimeRegression::Percent(0.0));
}

#[test]
fn fingerprint_mismatch_is_the_sole_reason_even_for_better_metrics() {
    let baseline = snapshot("abc", 80.0, 20.0);
    let candidate = with_default_categories(snapshot("xyz", 99.0, 1.0));

    let evaluation = evaluate_gate(&baseline, &candidate, &GateThresholds::default());
    assert!(!evaluation.verdict.passed);
    assert!(evaluation.dataset_mismatch());
    assert_eq!(
        reasons(&evaluation),
        vec!["dataset fingerprint mismatch (baseline=abc, candidate=xyz)".to_string()]
    );
    assert_eq!(evaluation.verdict.violations[0].check, GateCheck::DatasetMismatch);
}

#[test]
fn allowed_fingerprint_mismatch_runs_numeric_checks() {
    let baseline = with_default_categories(snapshot("abc", 92.0, 10.0));
    let candidate = with_default_categories(snapshot("xyz", 92.0, 10.0));
    let thresholds = GateThresholds {
        allow_dataset_mismatch: true,
        ..GateThresholds::default()
    };

    let evaluation = evaluate_gate(&baseline, &candidate, &thresholds);
    assert!(evaluation.verdict.passed);
    assert!(evaluation.measurements.is_some());
}

#[test]
fn zero_baseline_runtime_uses_explicit_sentinels() {
    assert_eq!(runtime_regression(0.0, 0.0), RuntimeRegression::Percent(0.0));
    assert_eq!(runtime_regression(0.0, 0.25), RuntimeRegression::Unbounded);
    assert!(RuntimeRegression::Unbounded.exceeds(1.0e12));
    assert!(!RuntimeRegression::Percent(0.0).exceeds(15.0));
    assert_eq!(RuntimeRegression::Unbounded.to_string(), "unbounded");
}

#[test]
fn zero_baseline_runtime_with_slower_candidate_fails_runtime_check() {
    let baseline = with_default_categories(snapshot("abc", 92.0, 0.0));
    let candidate = with_default_categories(snapshot("abc", 92.0, 3.0));
    let thresholds = GateThresholds {
        max_median_runtime_regression_pct: 1.0e9,
        ..GateThresholds::default()
    };

    let evaluation = evaluate_gate(&baseline, &candidate, &thresholds);
    assert!(!evaluation.verdict.passed);
    assert_eq!(evaluation.verdict.violations.len(), 1);
    assert_eq!(evaluation.verdict.violations[0].check, GateCheck::RuntimeRegression);
    assert_eq!(
        reasons(&evaluation)[0],
        "median runtime regression unbounded exceeds 1000000000.00%"
    );
}

#[test]
fn rate_drop_above_default_fails_while_runtime_stays_within_budget() {
    let baseline = with_default_categories(snapshot("abc", 92.0, 10.0));
    let candidate = with_default_categories(snapshot("abc", 90.5, 10.5));

    let evaluation = evaluate_gate(&baseline, &candidate, &GateThresholds::default());
    assert!(!evaluation.verdict.passed);
    assert_eq!(
        reasons(&evaluation),
        vec!["weighted-global rate drop 1.5000 pp exceeds 1.0000 pp".to_string()]
    );

    let measurements = evaluation.measurements.expect("numeric checks should run");
    assert!((measurements.rate_drop_pp - 1.5).abs() < 1e-9);
    match measurements.runtime_regression {
        RuntimeRegression::Percent(pct) => assert!((pct - 5.0).abs() < 1e-9, "got {pct}"),
        RuntimeRegression::Unbounded => panic!("baseline runtime is positive"),
    }
}

#[test]
fn missing_required_category_fails_independent_of_other_metrics() {
    let baseline = with_default_categories(snapshot("abc", 92.0, 10.0));
    let mut candidate = with_default_categories(snapshot("abc", 95.0, 5.0));
    candidate.categories.retain(|category| category.name != "lots");

    let evaluation = evaluate_gate(&baseline, &candidate, &GateThresholds::default());
    assert!(!evaluation.verdict.passed);
    assert_eq!(
        reasons(&evaluation),
        vec!["required category 'lots' missing from candidate".to_string()]
    );
    assert!(reasons(&evaluation)[0].starts_with("required category 'lots' missing"));
}

#[test]
fn every_failing_check_is_reported_in_order() {
    let baseline = with_default_categories(snapshot("abc", 92.0, 10.0));
    let mut candidate = with_default_categories(snapshot("abc", 85.0, 20.0));
    candidate.categories = vec![
        category("lots", 90.0, None),
        category("rotations", 89.0, None),
        category("nominal", 98.0, None),
    ];

    let evaluation = evaluate_gate(&baseline, &candidate, &GateThresholds::default());
    let checks = evaluation
        .verdict
        .violations
        .iter()
        .map(|violation| violation.check)
        .collect::<Vec<GateCheck>>();
    assert_eq!(
        checks,
        vec![
            GateCheck::GlobalRateDrop,
            GateCheck::RuntimeRegression,
            GateCheck::CategoryRateDrop,
            GateCheck::CategoryMissing,
        ]
    );
    assert_eq!(
        reasons(&evaluation)[2],
        "category 'lots' rate drop 5.0000 pp exceeds 2.0000 pp"
    );
    assert_eq!(
        reasons(&evaluation)[3],
        "required category 'high_version' missing from candidate"
    );
}

#[test]
fn category_reasons_follow_configured_threshold_order() {
    let baseline = with_default_categories(snapshot("abc", 92.0, 10.0));
    let candidate = with_default_categories(snapshot("abc", 92.0, 10.0));
    let specs = vec![
        "zeta=1".to_string(),
        "nominal=1".to_string(),
        "alpha=1".to_string(),
    ];
    let thresholds = GateThresholds {
        category_max_drop_pp: parse_category_thresholds(&specs).expect("specs should parse"),
        ..GateThresholds::default()
    };

    let evaluation = evaluate_gate(&baseline, &candidate, &thresholds);
    assert_eq!(
        reasons(&evaluation),
        vec![
            "required category 'zeta' missing from baseline and candidate".to_string(),
            "required category 'alpha' missing from baseline and candidate".to_string(),
        ]
    );
}

#[test]
fn category_absent_on_both_sides_is_reported_once() {
    let baseline = snapshot("abc", 92.0, 10.0);
    let candidate = snapshot("abc", 92.0, 10.0);
    let thresholds = GateThresholds {
        category_max_drop_pp: CategoryThresholds::from_pairs(&[("lots", 2.0)]),
        ..GateThresholds::default()
    };

    let evaluation = evaluate_gate(&baseline, &candidate, &thresholds);
    assert_eq!(
        reasons(&evaluation),
        vec!["required category 'lots' missing from baseline and candidate".to_string()]
    );
}

#[test]
fn category_thresholds_parse_and_replace_defaults() {
    let specs = vec!["lots=3.5".to_string(), " damaged = 0 ".to_string()];
    let parsed = parse_category_thresholds(&specs).expect("specs should parse");
    assert_eq!(
        parsed.as_slice(),
        &[("lots".to_string(), 3.5), ("damaged".to_string(), 0.0)]
    );

    assert_eq!(
        default_category_thresholds(),
        CategoryThresholds::from_pairs(&[
            ("lots", 2.0),
            ("rotations", 2.0),
            ("nominal", 1.5),
            ("high_version", 1.5),
        ])
    );
}

#[test]
fn invalid_category_threshold_specs_are_rejected() {
    let malformed = parse_category_thresholds(&["lots".to_string()]).expect_err("no '='");
    assert!(matches!(malformed, ThresholdError::Malformed { .. }));

    let empty_name = parse_category_thresholds(&["=2.0".to_string()]).expect_err("no name");
    assert!(matches!(empty_name, ThresholdError::Malformed { .. }));

    let not_number = parse_category_thresholds(&["lots=abc".to_string()]).expect_err("NaN-ish");
    assert_eq!(
        not_number.to_string(),
        "invalid --category-max-drop-pp 'lots=abc': 'abc' is not a number"
    );

    let nan = parse_category_thresholds(&["lots=NaN".to_string()]).expect_err("NaN");
    assert!(matches!(nan, ThresholdError::NotANumber { .. }));

    let duplicate = parse_category_thresholds(&["lots=1".to_string(), "lots=2".to_string()])
        .expect_err("duplicate names");
    assert!(matches!(duplicate, ThresholdError::Duplicate { ref name } if name == "lots"));
}

fn contribution_pair() -> (Snapshot, Snapshot) {
    let mut baseline = snapshot("abc", 80.0, 10.0);
    baseline.summary.total_expected = Some(100);
    baseline.categories = vec![
        category("lots", 70.0, Some((35, 50))),
        category("nominal", 90.0, Some((27, 30))),
        category("rotations", 90.0, Some((18, 20))),
    ];

    let mut candidate = snapshot("abc", 78.0, 10.0);
    candidate.summary.total_expected = Some(100);
    candidate.categories = vec![
        category("rotations", 95.0, Some((19, 20))),
        category("lots", 64.0, Some((32, 50))),
        category("nominal", 90.0, Some((27, 30))),
    ];
    (baseline, candidate)
}

#[test]
fn contributions_are_normalized_by_global_expected_and_sorted() {
    let (baseline, candidate) = contribution_pair();

    let rows = estimate_contributions(&baseline, &candidate).expect("denominator is defined");
    let order = rows.iter().map(|row| row.category.as_str()).collect::<Vec<&str>>();
    assert_eq!(order, vec!["lots", "rotations", "nominal"]);

    assert_eq!(rows[0].delta_hits, -3);
    assert!((rows[0].estimated_weighted_global_contribution_pp + 3.0).abs() < 1e-9);
    assert_eq!(rows[1].delta_hits, 1);
    assert!((rows[1].estimated_weighted_global_contribution_pp - 1.0).abs() < 1e-9);
    assert_eq!(rows[2].estimated_weighted_global_contribution_pp, 0.0);
}

#[test]
fn contributions_sum_to_global_delta_when_categories_cover_dataset() {
    let (baseline, candidate) = contribution_pair();
    let rows = estimate_contributions(&baseline, &candidate).expect("denominator is defined");

    let total = rows
        .iter()
        .map(|row| row.estimated_weighted_global_contribution_pp)
        .sum::<f64>();
    let global_delta =
        candidate.weighted_global_rate_percent() - baseline.weighted_global_rate_percent();
    assert!((total - global_delta).abs() < 1e-9, "total={total} delta={global_delta}");
}

#[test]
fn contribution_ties_break_on_category_name() {
    let mut baseline = snapshot("abc", 80.0, 10.0);
    baseline.summary.total_expected = Some(40);
    baseline.categories = vec![
        category("zeta", 50.0, Some((10, 20))),
        category("alpha", 50.0, Some((10, 20))),
    ];
    let mut candidate = baseline.clone();
    candidate.categories = vec![
        category("zeta", 55.0, Some((11, 20))),
        category("alpha", 45.0, Some((9, 20))),
    ];

    let rows = estimate_contributions(&baseline, &candidate).expect("denominator is defined");
    assert_eq!(rows[0].category, "alpha");
    assert_eq!(rows[1].category, "zeta");
}

#[test]
fn contributions_skip_without_a_positive_global_denominator() {
    let (mut baseline, candidate) = contribution_pair();
    baseline.summary.total_expected = None;
    assert!(estimate_contributions(&baseline, &candidate).is_none());

    baseline.summary = SnapshotSummary {
        total_expected: Some(0),
        ..baseline.summary
    };
    assert!(estimate_contributions(&baseline, &candidate).is_none());
}

#[test]
fn contributions_skip_categories_without_usable_hits() {
    let (mut baseline, mut candidate) = contribution_pair();
    baseline.categories[0].hit_counts = None;
    candidate.categories[0] = category("rotations", 95.0, Some((19, 0)));

    let rows = estimate_contributions(&baseline, &candidate).expect("denominator is defined");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].category, "nominal");
}

#[test]
fn comparison_output_lists_metrics_categories_and_every_failure() {
    let (baseline, candidate) = contribution_pair();
    let thresholds = GateThresholds {
        category_max_drop_pp: CategoryThresholds::from_pairs(&[("lots", 2.0)]),
        ..GateThresholds::default()
    };
    let evaluation = evaluate_gate(&baseline, &candidate, &thresholds);
    let contributions = estimate_contributions(&baseline, &candidate);

    let mut buffer = Vec::new();
    write_comparison(
        &mut buffer,
        &baseline,
        &candidate,
        &evaluation,
        contributions.as_deref(),
    )
    .expect("rendering into memory should succeed");
    let rendered = String::from_utf8(buffer).expect("output should be utf-8");

    assert!(rendered.contains("Dataset fingerprint: baseline=abc candidate=abc"));
    assert!(rendered.contains(
        "Weighted-global rate: baseline=80.0000% candidate=78.0000% drop=2.0000 pp"
    ));
    assert!(rendered.contains("regression=0.00%"));
    assert!(rendered.contains(
        "  lots             baseline=  70.00% candidate=  64.00% delta=  -6.00 pp"
    ));
    assert!(rendered.contains("delta_hits=-3 contribution=-3.0000 pp"));
    assert!(rendered.contains("FAIL: weighted-global rate drop 2.0000 pp exceeds 1.0000 pp"));
    assert!(rendered.contains("FAIL: category 'lots' rate drop 6.0000 pp exceeds 2.0000 pp"));
    assert!(!rendered.contains("PASS"));
}

#[test]
fn comparison_output_for_mismatch_stops_after_the_hint() {
    let baseline = snapshot("abc", 92.0, 10.0);
    let candidate = snapshot("xyz", 92.0, 10.0);
    let evaluation = evaluate_gate(&baseline, &candidate, &GateThresholds::default());

    let mut buffer = Vec::new();
    write_comparison(&mut buffer, &baseline, &candidate, &evaluation, None)
        .expect("rendering into memory should succeed");
    let rendered = String::from_utf8(buffer).expect("output should be utf-8");

    assert!(rendered.contains("FAIL: dataset fingerprint mismatch (baseline=abc, candidate=xyz)"));
    assert!(rendered.ends_with("Use --allow-dataset-mismatch only for exploratory comparisons.\n"));
    assert!(!rendered.contains("Weighted-global rate"));
}

#[test]
fn contribution_report_serializes_expected_shape() {
    let (baseline, candidate) = contribution_pair();
    let thresholds = GateThresholds::default();
    let rows = estimate_contributions(&baseline, &candidate).expect("denominator is defined");

    let report = build_contribution_report(&baseline, &candidate, &thresholds, &rows);
    let value = serde_json::to_value(&report).expect("report should serialize");

    assert_eq!(value["dataset_fingerprint"]["baseline"], "abc");
    assert_eq!(value["weighted_global"]["baseline_rate_percent"], 80.0);
    assert_eq!(value["weighted_global"]["delta_pp"], -2.0);
    assert_eq!(value["category_thresholds"]["lots"], 2.0);
    assert_eq!(value["contributions"][0]["category"], "lots");

    let text = serde_json::to_string(&report).expect("report should serialize");
    let thresholds_json = r#""category_thresholds":{"lots":2.0,"rotations":2.0,"nominal":1.5,"high_version":1.5}"#;
    assert!(text.contains(thresholds_json), "got {text}");
    assert_eq!(value["contributions"][0]["delta_hits"], -3);
    assert!(value["contributions"][0]["estimated_weighted_global_contribution_pp"].is_number());
}
