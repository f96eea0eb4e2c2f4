use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::cli::TriageArgs;
use crate::commands::GateOutcome;
use crate::extract::{extract_failure_clusters, load_artifact_document};
use crate::signatures::{EXAMPLE_PLACEHOLDER, TriageRow, rank_failure_clusters};
use crate::util::{markdown_cell, sha256_file, write_json_pretty, write_text_file};

pub const FAILURE_CLUSTERS_SCHEMA_VERSION: &str = "rustqr.failure_clusters.v1";

#[derive(Debug, Serialize)]
struct TriageReport<'a> {
    schema_version: &'static str,
    artifact: String,
    artifact_sha256: String,
    top_n: usize,
    clusters: &'a [TriageRow],
}

pub fn run(args: TriageArgs) -> Result<GateOutcome> {
    let document = load_artifact_document(&args.artifact)?;
    let label = args.artifact.display().to_string();
    let clusters = extract_failure_clusters(&document, &label);

    let top_n = args.top_n.max(1);
    let rows = rank_failure_clusters(&clusters, top_n);
    info!(
        artifact = %label,
        clusters = clusters.len(),
        reported = rows.len(),
        "ranked failure clusters"
    );

    let report = TriageReport {
        schema_version: FAILURE_CLUSTERS_SCHEMA_VERSION,
        artifact: label,
        artifact_sha256: sha256_file(&args.artifact)?,
        top_n,
        clusters: &rows,
    };
    write_json_pretty(&args.out_json, &report)?;
    write_text_file(&args.out_md, &render_triage_markdown(&rows, &args.artifact)?)?;

    println!("Wrote: {}", args.out_json.display());
    println!("Wrote: {}", args.out_md.display());
    Ok(GateOutcome::Pass)
}

fn render_triage_markdown(rows: &[TriageRow], artifact: &Path) -> Result<String> {
    let mut out = String::new();
    out.push_str("# Failure Cluster Triage Report\n\n");
    writeln!(out, "Source artifact: `{}`", artifact.display())?;
    out.push('\n');
    out.push_str("| Rank | Signature | Missed Images | Missed QR Weight | Likely Stage | Example |\n");
    out.push_str("|------|-----------|---------------|------------------|--------------|---------|\n");

    for (index, row) in rows.iter().enumerate() {
        let example = row
            .examples
            .first()
            .map_or(EXAMPLE_PLACEHOLDER, String::as_str);
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            index + 1,
            markdown_cell(&row.signature),
            row.count,
            row.qr_weight,
            markdown_cell(&row.stage_hint),
            markdown_cell(example),
        )?;
    }

    out.push_str("\n## Suggested Actions\n");
    for (index, row) in rows.iter().enumerate() {
        writeln!(
            out,
            "{}. `{}` -> focus on {} (weight={}, misses={}).",
            index + 1,
            row.signature,
            row.stage_hint,
            row.qr_weight,
            row.count
        )?;
    }
    Ok(out)
}
