//! Solver configuration.
//!
//! Provides [`SolverConfig`] with defaults for the dataset location, cache
//! and numeric precision. Values are layered: built-in defaults, then an
//! optional TOML or JSON file, then `NUCDECAY_*` environment variables.
//! Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use nucdecay_core::constants::DEFAULT_SIG_FIGS;
use nucdecay_core::{TimeUnit, UnitError};
use serde::{Deserialize, Serialize};

use crate::inventory::Precision;

/// Environment variable prefix, e.g. `NUCDECAY_SIG_FIGS=400`.
pub const ENV_PREFIX: &str = "NUCDECAY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Significant figures for high-precision exponentials.
    pub sig_figs: u32,
    /// Decay with exact rational matrices instead of `f64`.
    pub high_precision: bool,
    /// Dataset JSON file.
    pub dataset: PathBuf,
    /// Decomposition cache file; none disables caching.
    pub cache: Option<PathBuf>,
    /// Time unit assumed when none is given.
    pub default_time_unit: String,
    /// Log level filter string (e.g. "info", "debug", "nucdecay_engine=trace").
    pub log_level: String,
    /// Log output format ("text" or "json").
    pub log_format: String,
}

impl Default for SolverConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nucdecay");

        Self {
            sig_figs: DEFAULT_SIG_FIGS,
            high_precision: false,
            dataset: data_dir.join("dataset.json"),
            cache: None,
            default_time_unit: "s".to_string(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl SolverConfig {
    /// Load defaults, then `file` if given, then `NUCDECAY_*` variables.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_prefix(file, ENV_PREFIX)
    }

    pub(crate) fn load_with_prefix(file: Option<&Path>, prefix: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder
            .add_source(Environment::with_prefix(prefix).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Precision selected by `high_precision` and `sig_figs`.
    pub fn precision(&self) -> Precision {
        if self.high_precision {
            Precision::High {
                sig_figs: self.sig_figs,
            }
        } else {
            Precision::Fixed
        }
    }

    pub fn time_unit(&self) -> Result<TimeUnit, UnitError> {
        self.default_time_unit.parse()
    }
}
