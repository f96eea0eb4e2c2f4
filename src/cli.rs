use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "rustqr-bench",
    version,
    about = "Regression gate and failure triage for RustQR reading-rate artifacts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Gate a candidate artifact against a baseline.
    Compare(CompareArgs),
    /// Build the failure-signature tuning queue for a baseline/candidate pair.
    Tune(TuneArgs),
    /// Rank the failure clusters of a single artifact.
    Triage(TriageArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    #[arg(long)]
    pub baseline: PathBuf,

    #[arg(long)]
    pub candidate: PathBuf,

    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub max_rate_drop_pp: f64,

    #[arg(long, default_value_t = 15.0, allow_negative_numbers = true)]
    pub max_median_runtime_regression_pct: f64,

    #[arg(long, default_value_t = false)]
    pub allow_dataset_mismatch: bool,

    /// Per-category maximum rate drop as name=value; repeatable. Replaces the
    /// built-in lots/rotations/nominal/high_version thresholds.
    #[arg(long = "category-max-drop-pp", value_name = "NAME=PP")]
    pub category_max_drop_pp: Vec<String>,

    #[arg(long)]
    pub contribution_report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct TuneArgs {
    #[arg(long)]
    pub baseline: PathBuf,

    #[arg(long)]
    pub candidate: PathBuf,

    #[arg(long, default_value_t = 8)]
    pub top_n: usize,

    #[arg(long, default_value = "docs/failure_signature_tuning_queue.json")]
    pub out_json: PathBuf,

    #[arg(long, default_value = "docs/failure_signature_tuning_queue.md")]
    pub out_md: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct TriageArgs {
    #[arg(long)]
    pub artifact: PathBuf,

    #[arg(long, default_value_t = 8)]
    pub top_n: usize,

    #[arg(long, default_value = "docs/failure_cluster_report.json")]
    pub out_json: PathBuf,

    #[arg(long, default_value = "docs/failure_cluster_report.md")]
    pub out_md: PathBuf,
}
