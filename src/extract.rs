use std::fs;
use std::io;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{
    ArtifactProvenance, CategoryResult, FailureCluster, HitCounts, READING_RATE_SCHEMA_VERSION,
    Snapshot, SnapshotSummary, UNKNOWN_SIGNATURE,
};

pub const FIELD_WEIGHTED_GLOBAL_RATE: &str = "summary.weighted_global_rate_percent";
pub const FIELD_MEDIAN_RUNTIME: &str = "summary.runtime.median_per_image_ms";
pub const FIELD_TOTAL_EXPECTED: &str = "summary.total_expected";
pub const FIELD_TOTAL_HITS: &str = "summary.total_hits";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found: {path}")]
    NotFound { path: String },

    #[error("failed to read artifact {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    InvalidJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing summary in {source_label}")]
    MissingSummary { source_label: String },

    #[error("missing numeric {field} in {source_label}")]
    MissingNumeric {
        field: &'static str,
        source_label: String,
    },

    #[error("expected numeric {field} in {source_label}, found {found}")]
    NonNumeric {
        field: &'static str,
        source_label: String,
        found: &'static str,
    },

    #[error("expected integer {field} in {source_label}, found {value}")]
    NonInteger {
        field: &'static str,
        source_label: String,
        value: f64,
    },

    #[error("{field} must be >= 0 in {source_label}, found {value}")]
    NegativeMetric {
        field: &'static str,
        source_label: String,
        value: f64,
    },

    #[error("missing metadata.dataset_fingerprint in {source_label} (found {found})")]
    MissingFingerprint {
        source_label: String,
        found: &'static str,
    },
}

pub fn load_artifact_document(path: &Path) -> Result<Value, ArtifactError> {
    let raw = fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ArtifactError::NotFound {
                path: path.display().to_string(),
            }
        } else {
            ArtifactError::Unreadable {
                path: path.display().to_string(),
                source,
            }
        }
    })?;

    serde_json::from_slice::<Value>(&raw).map_err(|source| ArtifactError::InvalidJson {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot, ArtifactError> {
    let document = load_artifact_document(path)?;
    extract_snapshot(&document, &path.display().to_string())
}

/// Builds a validated [`Snapshot`] from a parsed reading-rate artifact.
///
/// The summary block and the dataset fingerprint are load-bearing and fail
/// hard when missing or mistyped. Category and failure-cluster rows are
/// best-effort: malformed rows are dropped or defaulted.
pub fn extract_snapshot(document: &Value, source_label: &str) -> Result<Snapshot, ArtifactError> {
    let summary = document
        .get("summary")
        .ok_or_else(|| ArtifactError::MissingSummary {
            source_label: source_label.to_string(),
        })?;

    let weighted_global_rate_percent = require_number(
        summary.get("weighted_global_rate_percent"),
        FIELD_WEIGHTED_GLOBAL_RATE,
        source_label,
    )?;
    let median_per_image_ms = require_number(
        summary
            .get("runtime")
            .and_then(|runtime| runtime.get("median_per_image_ms")),
        FIELD_MEDIAN_RUNTIME,
        source_label,
    )?;
    if median_per_image_ms < 0.0 {
        return Err(ArtifactError::NegativeMetric {
            field: FIELD_MEDIAN_RUNTIME,
            source_label: source_label.to_string(),
            value: median_per_image_ms,
        });
    }

    let dataset_fingerprint = require_fingerprint(document, source_label)?;

    let total_expected = optional_count(
        summary.get("total_expected"),
        FIELD_TOTAL_EXPECTED,
        source_label,
    )?;
    let total_hits = optional_count(summary.get("total_hits"), FIELD_TOTAL_HITS, source_label)?;

    let provenance = extract_provenance(document);
    if let Some(schema_version) = provenance.schema_version.as_deref()
        && schema_version != READING_RATE_SCHEMA_VERSION
    {
        warn!(
            source = %source_label,
            schema_version = %schema_version,
            expected = READING_RATE_SCHEMA_VERSION,
            "unexpected artifact schema version"
        );
    }

    Ok(Snapshot {
        source: source_label.to_string(),
        dataset_fingerprint,
        summary: SnapshotSummary {
            weighted_global_rate_percent,
            median_per_image_ms,
            total_expected,
            total_hits,
        },
        categories: extract_categories(document, source_label),
        failure_clusters: extract_failure_clusters(document, source_label),
        provenance,
    })
}

fn require_number(
    value: Option<&Value>,
    field: &'static str,
    source_label: &str,
) -> Result<f64, ArtifactError> {
    match value {
        None | Some(Value::Null) => Err(ArtifactError::MissingNumeric {
            field,
            source_label: source_label.to_string(),
        }),
        Some(value) => value.as_f64().ok_or_else(|| ArtifactError::NonNumeric {
            field,
            source_label: source_label.to_string(),
            found: json_type_name(value),
        }),
    }
}

fn require_fingerprint(document: &Value, source_label: &str) -> Result<String, ArtifactError> {
    let value = document
        .get("metadata")
        .and_then(|metadata| metadata.get("dataset_fingerprint"));

    match value {
        Some(Value::String(fingerprint)) if !fingerprint.is_empty() => Ok(fingerprint.clone()),
        Some(Value::String(_)) => Err(ArtifactError::MissingFingerprint {
            source_label: source_label.to_string(),
            found: "empty string",
        }),
        Some(other) => Err(ArtifactError::MissingFingerprint {
            source_label: source_label.to_string(),
            found: json_type_name(other),
        }),
        None => Err(ArtifactError::MissingFingerprint {
            source_label: source_label.to_string(),
            found: "nothing",
        }),
    }
}

// Absent or null counts are None. Anything else must be a non-negative
// integer; 800.0 is accepted as 800.
fn optional_count(
    value: Option<&Value>,
    field: &'static str,
    source_label: &str,
) -> Result<Option<u64>, ArtifactError> {
    let number = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(number)) => number,
        Some(other) => {
            return Err(ArtifactError::NonNumeric {
                field,
                source_label: source_label.to_string(),
                found: json_type_name(other),
            });
        }
    };

    if let Some(count) = number.as_u64() {
        return Ok(Some(count));
    }

    let value = number.as_f64().unwrap_or(f64::NAN);
    if value < 0.0 {
        return Err(ArtifactError::NegativeMetric {
            field,
            source_label: source_label.to_string(),
            value,
        });
    }
    if value.fract() != 0.0 || value > u64::MAX as f64 {
        return Err(ArtifactError::NonInteger {
            field,
            source_label: source_label.to_string(),
            value,
        });
    }
    Ok(Some(value as u64))
}

fn extract_provenance(document: &Value) -> ArtifactProvenance {
    let metadata = document.get("metadata");
    let metadata_string = |key: &str| {
        metadata
            .and_then(|metadata| metadata.get(key))
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
    };

    ArtifactProvenance {
        schema_version: document
            .get("schema_version")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
        commit_sha: metadata_string("commit_sha"),
        timestamp_utc: metadata_string("timestamp_utc"),
    }
}

fn extract_categories(document: &Value, source_label: &str) -> Vec<CategoryResult> {
    let Some(rows) = document.get("categories").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut categories = Vec::<CategoryResult>::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let name = row
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty());
        let rate_percent = row.get("rate_percent").and_then(Value::as_f64);
        let (Some(name), Some(rate_percent)) = (name, rate_percent) else {
            debug!(source = %source_label, index, "skipping malformed category entry");
            continue;
        };

        let hit_counts = match (
            row.get("hits").and_then(Value::as_u64),
            row.get("total_expected").and_then(Value::as_u64),
        ) {
            (Some(hits), Some(total_expected)) => Some(HitCounts {
                hits,
                total_expected,
            }),
            _ => {
                debug!(
                    source = %source_label,
                    category = %name,
                    "category has no usable hit counts"
                );
                None
            }
        };

        let category = CategoryResult {
            name: name.to_string(),
            rate_percent,
            hit_counts,
        };
        match categories.iter_mut().find(|existing| existing.name == category.name) {
            Some(existing) => {
                warn!(
                    source = %source_label,
                    category = %category.name,
                    "duplicate category entry replaces earlier row"
                );
                *existing = category;
            }
            None => categories.push(category),
        }
    }

    categories
}

/// Reads `failure_clusters` with per-field defaults. Never fails: rows that
/// are not objects are dropped and unusable fields fall back to the sentinel
/// signature, zero counts, or no examples.
pub fn extract_failure_clusters(document: &Value, source_label: &str) -> Vec<FailureCluster> {
    let Some(rows) = document.get("failure_clusters").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut clusters = Vec::<FailureCluster>::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        if !row.is_object() {
            debug!(source = %source_label, index, "skipping non-object failure cluster");
            continue;
        }

        let cluster = FailureCluster {
            signature: coerce_signature(row.get("signature")),
            count: coerce_count(row.get("count")),
            qr_weight: coerce_count(row.get("qr_weight")),
            examples: coerce_examples(row.get("examples")),
        };
        match clusters
            .iter_mut()
            .find(|existing| existing.signature == cluster.signature)
        {
            Some(existing) => {
                warn!(
                    source = %source_label,
                    signature = %cluster.signature,
                    "duplicate failure signature replaces earlier row"
                );
                *existing = cluster;
            }
            None => clusters.push(cluster),
        }
    }

    clusters
}

fn coerce_signature(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(signature)) if !signature.is_empty() => signature.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => UNKNOWN_SIGNATURE.to_string(),
    }
}

fn coerce_count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(number)) => number.as_u64().unwrap_or_else(|| {
            number
                .as_f64()
                .filter(|value| value.is_finite() && *value >= 0.0)
                .map(|value| value.trunc() as u64)
                .unwrap_or(0)
        }),
        Some(Value::String(text)) => text.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

fn coerce_examples(value: Option<&Value>) -> Vec<String> {
    let Some(values) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    values
        .iter()
        .map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
