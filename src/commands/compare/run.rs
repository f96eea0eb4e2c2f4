use super::*;

pub fn run(args: CompareArgs) -> Result<GateOutcome> {
    let thresholds = GateThresholds::from_args(&args)?;
    let baseline = load_snapshot(&args.baseline)?;
    let candidate = load_snapshot(&args.candidate)?;

    info!(
        baseline = %baseline.source,
        candidate = %candidate.source,
        categories = thresholds.category_max_drop_pp.as_slice().len(),
        allow_dataset_mismatch = thresholds.allow_dataset_mismatch,
        baseline_total_hits = ?baseline.summary.total_hits,
        candidate_total_hits = ?candidate.summary.total_hits,
        "comparing reading-rate artifacts"
    );

    if baseline.dataset_fingerprint != candidate.dataset_fingerprint
        && thresholds.allow_dataset_mismatch
    {
        warn!(
            baseline = %baseline.dataset_fingerprint,
            candidate = %candidate.dataset_fingerprint,
            "comparing artifacts from different datasets"
        );
    }

    let evaluation = evaluate_gate(&baseline, &candidate, &thresholds);
    let contributions = if evaluation.dataset_mismatch() {
        None
    } else {
        estimate_contributions(&baseline, &candidate)
    };

    let mut output = io::BufWriter::new(io::stdout().lock());
    write_comparison(
        &mut output,
        &baseline,
        &candidate,
        &evaluation,
        contributions.as_deref(),
    )?;
    output.flush().context("failed to flush comparison output")?;

    if let Some(report_path) = args.contribution_report_path.as_deref()
        && !evaluation.dataset_mismatch()
    {
        match contributions.as_deref() {
            Some(rows) => {
                let report = build_contribution_report(&baseline, &candidate, &thresholds, rows);
                write_json_pretty(report_path, &report)?;
                info!(
                    path = %report_path.display(),
                    rows = rows.len(),
                    "wrote contribution report"
                );
            }
            None => warn!(
                path = %report_path.display(),
                "contribution report skipped: baseline summary.total_expected is missing or zero"
            ),
        }
    }

    for violation in &evaluation.verdict.violations {
        warn!(
            check = violation.check.as_str(),
            reason = %violation.message,
            "gate check failed"
        );
    }

    if evaluation.verdict.passed {
        info!("reading-rate gate passed");
        Ok(GateOutcome::Pass)
    } else {
        info!(
            failures = evaluation.verdict.violations.len(),
            "reading-rate gate failed"
        );
        Ok(GateOutcome::Fail)
    }
}
