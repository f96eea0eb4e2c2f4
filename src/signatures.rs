use std::cmp::Reverse;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{FailureCluster, Snapshot};

pub const EXAMPLE_PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureHint {
    pub stage: &'static str,
    pub subsystem: &'static str,
    pub knobs: &'static str,
}

const SIGNATURE_HINTS: &[(&str, SignatureHint)] = &[
    (
        "no-finders",
        SignatureHint {
            stage: "binarization/finder detection",
            subsystem: "detector/finder+binarization",
            knobs: "QR_MAX_DIM, binarization policy, finder edge thresholds",
        },
    ),
    (
        "no-groups",
        SignatureHint {
            stage: "finder grouping / geometry consistency",
            subsystem: "detector/grouping",
            knobs: "group size ratio, geometry rerank weights",
        },
    ),
    (
        "transform-fail",
        SignatureHint {
            stage: "transform construction/refinement",
            subsystem: "transform/sampling",
            knobs: "transform refinement, timing validation thresholds",
        },
    ),
    (
        "format-fail",
        SignatureHint {
            stage: "sampling quality / format BCH extraction",
            subsystem: "format/sampling",
            knobs: "format BCH tolerance, sampling scale",
        },
    ),
    (
        "rs-fail",
        SignatureHint {
            stage: "Reed-Solomon correction / bitstream quality",
            subsystem: "reed-solomon",
            knobs: "erasure thresholds, max erasures",
        },
    ),
    (
        "payload-fail",
        SignatureHint {
            stage: "mode parsing / payload integrity",
            subsystem: "payload parser",
            knobs: "beam repair knobs, mode gating",
        },
    ),
    (
        "over-budget-skip",
        SignatureHint {
            stage: "decode budget manager thresholds",
            subsystem: "budget controller",
            knobs: "image attempt cap, lane split",
        },
    ),
    (
        "unknown-fail",
        SignatureHint {
            stage: "mixed signals; inspect per-image telemetry",
            subsystem: "mixed",
            knobs: "inspect per-image telemetry",
        },
    ),
];

const FALLBACK_HINT: SignatureHint = SignatureHint {
    stage: "investigate mixed pipeline signals",
    subsystem: "mixed",
    knobs: "inspect telemetry",
};

pub fn signature_hint(signature: &str) -> SignatureHint {
    SIGNATURE_HINTS
        .iter()
        .find(|(known, _)| *known == signature)
        .map(|(_, hint)| *hint)
        .unwrap_or(FALLBACK_HINT)
}

/// One signature's before/after movement between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureDelta {
    pub signature: String,
    pub baseline_count: u64,
    pub candidate_count: u64,
    pub delta_count: i64,
    pub baseline_qr_weight: u64,
    pub candidate_qr_weight: u64,
    pub delta_qr_weight: i64,
    pub likely_subsystem: String,
    pub proposed_knobs: String,
    pub example: String,
}

/// Merges both snapshots' failure clusters by signature and ranks the
/// movements: largest absolute QR-weight delta first, then largest absolute
/// count delta, then signature name. A signature missing on one side counts
/// as zero there.
pub fn rank_signature_deltas(
    baseline: &Snapshot,
    candidate: &Snapshot,
    top_n: usize,
) -> Vec<SignatureDelta> {
    let baseline_clusters = baseline.failure_cluster_index();
    let candidate_clusters = candidate.failure_cluster_index();
    let signatures = baseline_clusters
        .keys()
        .chain(candidate_clusters.keys())
        .copied()
        .collect::<BTreeSet<&str>>();

    let mut rows = signatures
        .into_iter()
        .map(|signature| {
            signature_delta(
                signature,
                baseline_clusters.get(signature).copied(),
                candidate_clusters.get(signature).copied(),
            )
        })
        .collect::<Vec<SignatureDelta>>();

    rows.sort_by(|left, right| {
        left.delta_qr_weight
            .unsigned_abs()
            .cmp(&right.delta_qr_weight.unsigned_abs())
            .reverse()
            .then_with(|| {
                left.delta_count
                    .unsigned_abs()
                    .cmp(&right.delta_count.unsigned_abs())
                    .reverse()
            })
            .then_with(|| left.signature.cmp(&right.signature))
    });
    rows.truncate(top_n.max(1));
    rows
}

fn signature_delta(
    signature: &str,
    baseline: Option<&FailureCluster>,
    candidate: Option<&FailureCluster>,
) -> SignatureDelta {
    let baseline_count = baseline.map_or(0, |cluster| cluster.count);
    let candidate_count = candidate.map_or(0, |cluster| cluster.count);
    let baseline_qr_weight = baseline.map_or(0, |cluster| cluster.qr_weight);
    let candidate_qr_weight = candidate.map_or(0, |cluster| cluster.qr_weight);
    let hint = signature_hint(signature);

    let example = candidate
        .and_then(|cluster| cluster.examples.first())
        .or_else(|| baseline.and_then(|cluster| cluster.examples.first()))
        .cloned()
        .unwrap_or_else(|| EXAMPLE_PLACEHOLDER.to_string());

    SignatureDelta {
        signature: signature.to_string(),
        baseline_count,
        candidate_count,
        delta_count: signed_delta(baseline_count, candidate_count),
        baseline_qr_weight,
        candidate_qr_weight,
        delta_qr_weight: signed_delta(baseline_qr_weight, candidate_qr_weight),
        likely_subsystem: hint.subsystem.to_string(),
        proposed_knobs: hint.knobs.to_string(),
        example,
    }
}

fn signed_delta(baseline: u64, candidate: u64) -> i64 {
    let delta = i128::from(candidate) - i128::from(baseline);
    delta.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriageRow {
    pub signature: String,
    pub count: u64,
    pub qr_weight: u64,
    pub examples: Vec<String>,
    pub stage_hint: String,
}

pub fn rank_failure_clusters(clusters: &[FailureCluster], top_n: usize) -> Vec<TriageRow> {
    let mut rows = clusters
        .iter()
        .map(|cluster| TriageRow {
            signature: cluster.signature.clone(),
            count: cluster.count,
            qr_weight: cluster.qr_weight,
            examples: cluster.examples.clone(),
            stage_hint: signature_hint(&cluster.signature).stage.to_string(),
        })
        .collect::<Vec<TriageRow>>();

    rows.sort_by_key(|row| (Reverse(row.qr_weight), Reverse(row.count), row.signature.clone()));
    rows.truncate(top_n.max(1));
    rows
}
