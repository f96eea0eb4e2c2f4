use regex::Regex;
use serde::Serializer;

use super::*;

pub const DEFAULT_MAX_RATE_DROP_PP: f64 = 1.0;
pub const DEFAULT_MAX_MEDIAN_RUNTIME_REGRESSION_PCT: f64 = 15.0;
pub const DEFAULT_CATEGORY_MAX_DROP_PP: &[(&str, f64)] = &[
    ("lots", 2.0),
    ("rotations", 2.0),
    ("nominal", 1.5),
    ("high_version", 1.5),
];

#[derive(Debug, Error)]
pub enum ThresholdError {
    #[error("invalid --category-max-drop-pp '{spec}': expected name=value")]
    Malformed { spec: String },

    #[error("invalid --category-max-drop-pp '{spec}': '{value}' is not a number")]
    NotANumber { spec: String, value: String },

    #[error("duplicate --category-max-drop-pp entry for category '{name}'")]
    Duplicate { name: String },

    #[error("--{flag} must be a number, got NaN")]
    NotANumberFlag { flag: &'static str },

    #[error("failed to compile threshold pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GateThresholds {
    pub max_rate_drop_pp: f64,
    pub max_median_runtime_regression_pct: f64,
    pub allow_dataset_mismatch: bool,
    pub category_max_drop_pp: CategoryThresholds,
}

/// Per-category drop limits, kept in the order they were configured.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryThresholds(Vec<(String, f64)>);

impl CategoryThresholds {
    pub fn from_pairs(pairs: &[(&str, f64)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(name, threshold)| (name.to_string(), *threshold))
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[(String, f64)] {
        &self.0
    }

    fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(existing, _)| existing == name)
    }
}

impl Serialize for CategoryThresholds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, threshold)| (name, threshold)))
    }
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            max_rate_drop_pp: DEFAULT_MAX_RATE_DROP_PP,
            max_median_runtime_regression_pct: DEFAULT_MAX_MEDIAN_RUNTIME_REGRESSION_PCT,
            allow_dataset_mismatch: false,
            category_max_drop_pp: default_category_thresholds(),
        }
    }
}

impl GateThresholds {
    pub fn from_args(args: &CompareArgs) -> Result<Self, ThresholdError> {
        if args.max_rate_drop_pp.is_nan() {
            return Err(ThresholdError::NotANumberFlag {
                flag: "max-rate-drop-pp",
            });
        }
        if args.max_median_runtime_regression_pct.is_nan() {
            return Err(ThresholdError::NotANumberFlag {
                flag: "max-median-runtime-regression-pct",
            });
        }

        let category_max_drop_pp = if args.category_max_drop_pp.is_empty() {
            default_category_thresholds()
        } else {
            parse_category_thresholds(&args.category_max_drop_pp)?
        };

        Ok(Self {
            max_rate_drop_pp: args.max_rate_drop_pp,
            max_median_runtime_regression_pct: args.max_median_runtime_regression_pct,
            allow_dataset_mismatch: args.allow_dataset_mismatch,
            category_max_drop_pp,
        })
    }
}

pub fn default_category_thresholds() -> CategoryThresholds {
    CategoryThresholds::from_pairs(DEFAULT_CATEGORY_MAX_DROP_PP)
}

pub fn parse_category_thresholds(specs: &[String]) -> Result<CategoryThresholds, ThresholdError> {
    let pattern = Regex::new(r"^\s*([^=\s][^=]*?)\s*=\s*(\S+)\s*$")?;

    let mut thresholds = CategoryThresholds::default();
    for spec in specs {
        let captures = pattern.captures(spec).ok_or_else(|| ThresholdError::Malformed {
            spec: spec.clone(),
        })?;
        let name = captures[1].to_string();
        let raw_value = &captures[2];
        let value = raw_value
            .parse::<f64>()
            .ok()
            .filter(|value| !value.is_nan())
            .ok_or_else(|| ThresholdError::NotANumber {
                spec: spec.clone(),
                value: raw_value.to_string(),
            })?;

        if thresholds.contains(&name) {
            return Err(ThresholdError::Duplicate { name });
        }
        thresholds.0.push((name, value));
    }

    Ok(thresholds)
}
