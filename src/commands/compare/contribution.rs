use super::*;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryContribution {
    pub category: String,
    pub baseline_hits: u64,
    pub candidate_hits: u64,
    pub delta_hits: i64,
    pub estimated_weighted_global_contribution_pp: f64,
}

/// Attributes the weighted-global delta to categories through hit deltas,
/// scaled by the baseline's global expected count so rows share one
/// percentage-point scale.
///
/// Returns `None` when the baseline has no positive `summary.total_expected`.
pub fn estimate_contributions(
    baseline: &Snapshot,
    candidate: &Snapshot,
) -> Option<Vec<CategoryContribution>> {
    let global_expected = baseline
        .summary
        .total_expected
        .filter(|total_expected| *total_expected > 0)?;

    let candidate_categories = candidate.category_index();
    let mut rows = Vec::new();
    for baseline_category in &baseline.categories {
        let Some(baseline_counts) = baseline_category.hit_counts else {
            continue;
        };
        let Some(candidate_counts) = candidate_categories
            .get(baseline_category.name.as_str())
            .and_then(|category| category.hit_counts)
        else {
            continue;
        };
        if baseline_counts.total_expected == 0 || candidate_counts.total_expected == 0 {
            continue;
        }

        let delta_hits = i128::from(candidate_counts.hits) - i128::from(baseline_counts.hits);
        rows.push(CategoryContribution {
            category: baseline_category.name.clone(),
            baseline_hits: baseline_counts.hits,
            candidate_hits: candidate_counts.hits,
            delta_hits: delta_hits.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64,
            estimated_weighted_global_contribution_pp: delta_hits as f64
                / global_expected as f64
                * 100.0,
        });
    }

    rows.sort_by(|left, right| {
        right
            .estimated_weighted_global_contribution_pp
            .abs()
            .total_cmp(&left.estimated_weighted_global_contribution_pp.abs())
            .then_with(|| left.category.cmp(&right.category))
    });
    Some(rows)
}

#[derive(Debug, Serialize)]
pub struct FingerprintPair {
    pub baseline: String,
    pub candidate: String,
}

#[derive(Debug, Serialize)]
pub struct WeightedGlobalDelta {
    pub baseline_rate_percent: f64,
    pub candidate_rate_percent: f64,
    pub delta_pp: f64,
}

#[derive(Debug, Serialize)]
pub struct ContributionReport<'a> {
    pub baseline: String,
    pub candidate: String,
    pub dataset_fingerprint: FingerprintPair,
    pub weighted_global: WeightedGlobalDelta,
    pub category_thresholds: &'a CategoryThresholds,
    pub contributions: &'a [CategoryContribution],
}

pub fn build_contribution_report<'a>(
    baseline: &Snapshot,
    candidate: &Snapshot,
    thresholds: &'a GateThresholds,
    contributions: &'a [CategoryContribution],
) -> ContributionReport<'a> {
    ContributionReport {
        baseline: baseline.source.clone(),
        candidate: candidate.source.clone(),
        dataset_fingerprint: FingerprintPair {
            baseline: baseline.dataset_fingerprint.clone(),
            candidate: candidate.dataset_fingerprint.clone(),
        },
        weighted_global: WeightedGlobalDelta {
            baseline_rate_percent: baseline.weighted_global_rate_percent(),
            candidate_rate_percent: candidate.weighted_global_rate_percent(),
            delta_pp: candidate.weighted_global_rate_percent()
                - baseline.weighted_global_rate_percent(),
        },
        category_thresholds: &thresholds.category_max_drop_pp,
        contributions,
    }
}
