use super::*;

pub fn run(args: TuneArgs) -> Result<GateOutcome> {
    let baseline = load_snapshot(&args.baseline)?;
    let candidate = load_snapshot(&args.candidate)?;
    if baseline.dataset_fingerprint != candidate.dataset_fingerprint {
        warn!(
            baseline = %baseline.dataset_fingerprint,
            candidate = %candidate.dataset_fingerprint,
            "tuning queue built from artifacts with different datasets"
        );
    }

    let top_n = args.top_n.max(1);
    let tuning = build_tuning_queue(&baseline, &candidate, top_n);
    info!(
        signatures = tuning.queue.len(),
        categories = tuning.category_rate_deltas_pp.len(),
        top_n,
        "built failure-signature tuning queue"
    );

    let report = TuningQueueReport {
        schema_version: TUNING_SCHEMA_VERSION,
        baseline: &baseline.source,
        candidate: &candidate.source,
        artifact_sha256: ArtifactDigests {
            baseline: sha256_file(&args.baseline)?,
            candidate: sha256_file(&args.candidate)?,
        },
        top_n,
        tuning: &tuning,
    };

    write_json_pretty(&args.out_json, &report)?;
    write_text_file(
        &args.out_md,
        &render_tuning_markdown(&tuning.queue, &args.baseline, &args.candidate)?,
    )?;

    println!("Wrote: {}", args.out_json.display());
    println!("Wrote: {}", args.out_md.display());
    Ok(GateOutcome::Pass)
}
