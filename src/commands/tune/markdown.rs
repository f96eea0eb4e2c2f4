use super::*;

const MERGE_CRITERIA: &[&str] = &[
    "Accept only changes with net weighted-global gain and no gate regressions.",
    "Require at least one top-ranked signature to improve in QR weight.",
    "Re-run the compare gate to verify runtime guardrail remains satisfied.",
];

pub fn render_tuning_markdown(queue: &[SignatureDelta], baseline: &Path, candidate: &Path) -> Result<String> {
    let mut out = String::new();
    out.push_str("# Failure Signature Tuning Queue\n\n");
    writeln!(out, "Baseline: `{}`", baseline.display())?;
    writeln!(out, "Candidate: `{}`", candidate.display())?;
    out.push('\n');
    out.push_str(
        "| Rank | Signature | Delta QR Weight | Delta Count | Subsystem | Proposed Knobs | Example |\n",
    );
    out.push_str(
        "|------|-----------|-----------------|-------------|-----------|----------------|---------|\n",
    );

    for (index, row) in queue.iter().enumerate() {
        writeln!(
            out,
            "| {} | {} | {:+} | {:+} | {} | {} | {} |",
            index + 1,
            markdown_cell(&row.signature),
            row.delta_qr_weight,
            row.delta_count,
            markdown_cell(&row.likely_subsystem),
            markdown_cell(&row.proposed_knobs),
            markdown_cell(&row.example),
        )?;
    }

    out.push_str("\n## Merge Criteria\n");
    for (index, criterion) in MERGE_CRITERIA.iter().enumerate() {
        writeln!(out, "{}. {}", index + 1, criterion)?;
    }
    Ok(out)
}
