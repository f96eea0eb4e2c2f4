use super::*;

pub fn write_comparison<W: Write>(
    output: &mut W,
    baseline: &Snapshot,
    candidate: &Snapshot,
    evaluation: &GateEvaluation,
    contributions: Option<&[CategoryContribution]>,
) -> Result<()> {
    writeln!(output, "RustQR reading-rate A/B comparison")?;
    writeln!(output, "Baseline:  {}", baseline.source)?;
    writeln!(output, "Candidate: {}", candidate.source)?;
    if baseline.provenance.commit_sha.is_some() || candidate.provenance.commit_sha.is_some() {
        writeln!(
            output,
            "Commit: baseline={} candidate={}",
            baseline.provenance.commit_sha.as_deref().unwrap_or("unknown"),
            candidate.provenance.commit_sha.as_deref().unwrap_or("unknown"),
        )?;
    }
    if baseline.provenance.timestamp_utc.is_some() || candidate.provenance.timestamp_utc.is_some() {
        writeln!(
            output,
            "Recorded: baseline={} candidate={}",
            baseline.provenance.timestamp_utc.as_deref().unwrap_or("unknown"),
            candidate.provenance.timestamp_utc.as_deref().unwrap_or("unknown"),
        )?;
    }
    writeln!(
        output,
        "Dataset fingerprint: baseline={} candidate={}",
        baseline.dataset_fingerprint, candidate.dataset_fingerprint
    )?;

    let Some(measurements) = evaluation.measurements else {
        write_verdict(output, &evaluation.verdict)?;
        writeln!(
            output,
            "Use --allow-dataset-mismatch only for exploratory comparisons."
        )?;
        return Ok(());
    };

    writeln!(
        output,
        "Weighted-global rate: baseline={:.4}% candidate={:.4}% drop={:.4} pp",
        baseline.weighted_global_rate_percent(),
        candidate.weighted_global_rate_percent(),
        measurements.rate_drop_pp,
    )?;
    writeln!(
        output,
        "Median runtime: baseline={:.4} ms candidate={:.4} ms regression={}",
        baseline.median_per_image_ms(),
        candidate.median_per_image_ms(),
        measurements.runtime_regression,
    )?;

    write_category_deltas(output, baseline, candidate)?;
    if let Some(contributions) = contributions
        && !contributions.is_empty()
    {
        write_contributions(output, contributions)?;
    }

    write_verdict(output, &evaluation.verdict)
}

fn write_category_deltas<W: Write>(
    output: &mut W,
    baseline: &Snapshot,
    candidate: &Snapshot,
) -> Result<()> {
    let candidate_categories = candidate.category_index();
    let mut shared = baseline
        .categories
        .iter()
        .filter_map(|baseline_category| {
            candidate_categories
                .get(baseline_category.name.as_str())
                .map(|candidate_category| (baseline_category, *candidate_category))
        })
        .collect::<Vec<_>>();
    if shared.is_empty() {
        return Ok(());
    }
    shared.sort_by(|left, right| left.0.name.cmp(&right.0.name));

    writeln!(
        output,
        "Per-category deltas (candidate - baseline, percentage points):"
    )?;
    for (baseline_category, candidate_category) in shared {
        let delta = candidate_category.rate_percent - baseline_category.rate_percent;
        writeln!(
            output,
            "  {:<16} baseline={:7.2}% candidate={:7.2}% delta={:+7.2} pp",
            baseline_category.name,
            baseline_category.rate_percent,
            candidate_category.rate_percent,
            delta,
        )?;
    }
    Ok(())
}

fn write_contributions<W: Write>(
    output: &mut W,
    contributions: &[CategoryContribution],
) -> Result<()> {
    writeln!(
        output,
        "Estimated weighted-global contribution by category (percentage points):"
    )?;
    for row in contributions {
        writeln!(
            output,
            "  {:<16} baseline_hits={} candidate_hits={} delta_hits={:+} contribution={:+.4} pp",
            row.category,
            row.baseline_hits,
            row.candidate_hits,
            row.delta_hits,
            row.estimated_weighted_global_contribution_pp,
        )?;
    }
    Ok(())
}

fn write_verdict<W: Write>(output: &mut W, verdict: &Verdict) -> Result<()> {
    if verdict.passed {
        writeln!(output, "PASS: thresholds satisfied")?;
        return Ok(());
    }

    for reason in verdict.reasons() {
        writeln!(output, "FAIL: {reason}")?;
    }
    Ok(())
}
