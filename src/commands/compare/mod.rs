use std::fmt;
use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::cli::CompareArgs;
use crate::commands::GateOutcome;
use crate::extract::load_snapshot;
use crate::model::{CategoryResult, Snapshot};
use crate::util::write_json_pretty;

mod contribution;
mod gate;
mod output;
mod run;
mod thresholds;
#[cfg(test)]
mod tests;

use self::contribution::*;
use self::gate::*;
use self::output::*;
use self::thresholds::*;

pub use self::run::run;
