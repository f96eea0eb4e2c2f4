use super::*;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TuningQueue {
    pub queue: Vec<SignatureDelta>,
    pub category_rate_deltas_pp: BTreeMap<String, f64>,
}

/// Packages the ranked signature movements with per-category rate deltas.
pub fn build_tuning_queue(baseline: &Snapshot, candidate: &Snapshot, top_n: usize) -> TuningQueue {
    TuningQueue {
        queue: rank_signature_deltas(baseline, candidate, top_n),
        category_rate_deltas_pp: category_rate_deltas(baseline, candidate),
    }
}

// Union of category names; a side without the category contributes 0.0.
pub fn category_rate_deltas(baseline: &Snapshot, candidate: &Snapshot) -> BTreeMap<String, f64> {
    let mut deltas = BTreeMap::new();
    for category in &baseline.categories {
        deltas.insert(category.name.clone(), -category.rate_percent);
    }
    for category in &candidate.categories {
        *deltas.entry(category.name.clone()).or_insert(0.0) += category.rate_percent;
    }
    deltas
}

#[derive(Debug, Serialize)]
pub struct ArtifactDigests {
    pub baseline: String,
    pub candidate: String,
}

#[derive(Debug, Serialize)]
pub struct TuningQueueReport<'a> {
    pub schema_version: &'static str,
    pub baseline: &'a str,
    pub candidate: &'a str,
    pub artifact_sha256: ArtifactDigests,
    pub top_n: usize,
    #[serde(flatten)]
    pub tuning: &'a TuningQueue,
}
