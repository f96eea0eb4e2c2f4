use super::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuntimeRegression {
    Percent(f64),
    // Baseline median is zero and the candidate is slower.
    Unbounded,
}

impl RuntimeRegression {
    pub fn exceeds(self, max_pct: f64) -> bool {
        match self {
            Self::Percent(pct) => pct > max_pct,
            Self::Unbounded => max_pct < f64::INFINITY,
        }
    }
}

impl fmt::Display for RuntimeRegression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(pct) => write!(f, "{pct:.2}%"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

pub fn runtime_regression(baseline_median_ms: f64, candidate_median_ms: f64) -> RuntimeRegression {
    if baseline_median_ms <= 0.0 {
        if candidate_median_ms <= 0.0 {
            RuntimeRegression::Percent(0.0)
        } else {
            RuntimeRegression::Unbounded
        }
    } else {
        RuntimeRegression::Percent(
            (candidate_median_ms - baseline_median_ms) / baseline_median_ms * 100.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateCheck {
    DatasetMismatch,
    GlobalRateDrop,
    RuntimeRegression,
    CategoryMissing,
    CategoryRateDrop,
}

impl GateCheck {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DatasetMismatch => "dataset_mismatch",
            Self::GlobalRateDrop => "global_rate_drop",
            Self::RuntimeRegression => "runtime_regression",
            Self::CategoryMissing => "category_missing",
            Self::CategoryRateDrop => "category_rate_drop",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub check: GateCheck,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub passed: bool,
    pub violations: Vec<Violation>,
}

impl Verdict {
    fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            passed: violations.is_empty(),
            violations,
        }
    }

    pub fn reasons(&self) -> Vec<String> {
        self.violations
            .iter()
            .map(|violation| violation.message.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateMeasurements {
    pub rate_drop_pp: f64,
    pub runtime_regression: RuntimeRegression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GateEvaluation {
    pub verdict: Verdict,
    // None when the dataset check short-circuited the numeric checks.
    pub measurements: Option<GateMeasurements>,
}

impl GateEvaluation {
    pub fn dataset_mismatch(&self) -> bool {
        self.measurements.is_none()
    }
}

/// Runs every gate check and collects all violations.
///
/// A dataset fingerprint mismatch (without the override) is the one
/// exception: it becomes the sole violation and no numeric check runs.
pub fn evaluate_gate(
    baseline: &Snapshot,
    candidate: &Snapshot,
    thresholds: &GateThresholds,
) -> GateEvaluation {
    if baseline.dataset_fingerprint != candidate.dataset_fingerprint
        && !thresholds.allow_dataset_mismatch
    {
        return GateEvaluation {
            verdict: Verdict::from_violations(vec![Violation {
                check: GateCheck::DatasetMismatch,
                message: format!(
                    "dataset fingerprint mismatch (baseline={}, candidate={})",
                    baseline.dataset_fingerprint, candidate.dataset_fingerprint
                ),
            }]),
            measurements: None,
        };
    }

    let mut violations = Vec::new();

    let rate_drop_pp =
        baseline.weighted_global_rate_percent() - candidate.weighted_global_rate_percent();
    if rate_drop_pp > thresholds.max_rate_drop_pp {
        violations.push(Violation {
            check: GateCheck::GlobalRateDrop,
            message: format!(
                "weighted-global rate drop {:.4} pp exceeds {:.4} pp",
                rate_drop_pp, thresholds.max_rate_drop_pp
            ),
        });
    }

    let regression = runtime_regression(
        baseline.median_per_image_ms(),
        candidate.median_per_image_ms(),
    );
    if regression.exceeds(thresholds.max_median_runtime_regression_pct) {
        violations.push(Violation {
            check: GateCheck::RuntimeRegression,
            message: format!(
                "median runtime regression {} exceeds {:.2}%",
                regression, thresholds.max_median_runtime_regression_pct
            ),
        });
    }

    let baseline_categories = baseline.category_index();
    let candidate_categories = candidate.category_index();
    for (name, max_drop_pp) in thresholds.category_max_drop_pp.as_slice() {
        violations.extend(check_category(
            name,
            baseline_categories.get(name.as_str()).copied(),
            candidate_categories.get(name.as_str()).copied(),
            *max_drop_pp,
        ));
    }

    GateEvaluation {
        verdict: Verdict::from_violations(violations),
        measurements: Some(GateMeasurements {
            rate_drop_pp,
            runtime_regression: regression,
        }),
    }
}

fn check_category(
    name: &str,
    baseline: Option<&CategoryResult>,
    candidate: Option<&CategoryResult>,
    max_drop_pp: f64,
) -> Option<Violation> {
    let side = match (baseline, candidate) {
        (Some(baseline_category), Some(candidate_category)) => {
            let drop_pp = baseline_category.rate_percent - candidate_category.rate_percent;
            return (drop_pp > max_drop_pp).then(|| Violation {
                check: GateCheck::CategoryRateDrop,
                message: format!(
                    "category '{name}' rate drop {drop_pp:.4} pp exceeds {max_drop_pp:.4} pp"
                ),
            });
        }
        (None, None) => "baseline and candidate",
        (None, Some(_)) => "baseline",
        (Some(_), None) => "candidate",
    };
    Some(Violation {
        check: GateCheck::CategoryMissing,
        message: format!("required category '{name}' missing from {side}"),
    })
}
