use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::TuneArgs;
use crate::commands::GateOutcome;
use crate::extract::load_snapshot;
use crate::model::Snapshot;
use crate::signatures::{SignatureDelta, rank_signature_deltas};
use crate::util::{markdown_cell, sha256_file, write_json_pretty, write_text_file};

pub const TUNING_SCHEMA_VERSION: &str = "rustqr.failure_signature_tuning.v1";

mod markdown;
mod queue;
mod run;

use self::markdown::*;
use self::queue::*;

pub use self::run::run;
