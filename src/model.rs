use std::collections::BTreeMap;

use serde::Serialize;

pub const READING_RATE_SCHEMA_VERSION: &str = "rustqr.reading_rate.v1";
pub const UNKNOWN_SIGNATURE: &str = "unknown-fail";

/// One benchmark run, validated and immutable once extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub source: String,
    pub dataset_fingerprint: String,
    pub summary: SnapshotSummary,
    pub categories: Vec<CategoryResult>,
    pub failure_clusters: Vec<FailureCluster>,
    pub provenance: ArtifactProvenance,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotSummary {
    pub weighted_global_rate_percent: f64,
    pub median_per_image_ms: f64,
    pub total_expected: Option<u64>,
    pub total_hits: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryResult {
    pub name: String,
    pub rate_percent: f64,
    // None when hits/total_expected are absent or not integers; the category
    // still takes part in rate comparisons.
    pub hit_counts: Option<HitCounts>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitCounts {
    pub hits: u64,
    pub total_expected: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureCluster {
    pub signature: String,
    pub count: u64,
    pub qr_weight: u64,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactProvenance {
    pub schema_version: Option<String>,
    pub commit_sha: Option<String>,
    pub timestamp_utc: Option<String>,
}

impl Snapshot {
    pub fn category_index(&self) -> BTreeMap<&str, &CategoryResult> {
        self.categories
            .iter()
            .map(|category| (category.name.as_str(), category))
            .collect()
    }

    pub fn failure_cluster_index(&self) -> BTreeMap<&str, &FailureCluster> {
        self.failure_clusters
            .iter()
            .map(|cluster| (cluster.signature.as_str(), cluster))
            .collect()
    }

    pub fn median_per_image_ms(&self) -> f64 {
        self.summary.median_per_image_ms
    }

    pub fn weighted_global_rate_percent(&self) -> f64 {
        self.summary.weighted_global_rate_percent
    }
}
