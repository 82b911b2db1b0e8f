use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthSeedError};
use crate::generate::plan::{ColumnOverride, GenerateOptions};

/// Format of `base_time` in the lock file.
const BASE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// The synthseed.lock file structure for deterministic reproducibility.
///
/// When `synthseed generate` runs, it writes this lock file. A teammate
/// can run `synthseed generate --from-lock` to reproduce the exact same
/// dataset. If the schema document has changed, synthseed refuses and
/// requires `--force` to regenerate.
///
/// # Merge conflicts
///
/// Treat `synthseed.lock` like `package-lock.json`. If there is a merge
/// conflict, **do not** resolve it by hand. Instead:
///
/// ```bash
/// git checkout --ours synthseed.lock
/// synthseed generate schema.json --force
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockFile {
    /// SHA-256 of the normalized schema document.
    pub schema_hash: String,
    /// Random seed used for generation.
    pub seed: u64,
    /// synthseed version that generated this lock file.
    pub synthseed_version: String,
    /// Generation configuration.
    pub config: LockConfig,
    /// Pinned base timestamp, ISO 8601 (e.g. "2025-06-15T12:00:00").
    pub base_time: String,
    /// Wall-clock time the lock file was created. Informational only.
    pub created_at: String,
}

/// Everything besides the seed and base time that shapes the output.
///
/// `BTreeMap` keeps key order alphabetical so lock files diff cleanly.
/// The worker count is not recorded: it never changes the output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LockConfig {
    /// Per-table record count overrides.
    pub table_row_overrides: BTreeMap<String, usize>,
    /// Column overrides from synthseed.toml at generation time, so
    /// `--from-lock` reproduces them even if the config has changed since.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub column_overrides: BTreeMap<String, ColumnOverrideLock>,
    pub null_probability: f64,
    pub edge_case_probability: f64,
    pub max_unique_retries: usize,
}

/// Column override captured in the lock file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnOverrideLock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_case_probability: Option<f64>,
}

impl From<&ColumnOverride> for ColumnOverrideLock {
    fn from(o: &ColumnOverride) -> Self {
        Self {
            values: o.values.clone(),
            weights: o.weights.clone(),
            null_probability: o.null_probability,
            edge_case_probability: o.edge_case_probability,
        }
    }
}

impl From<&ColumnOverrideLock> for ColumnOverride {
    fn from(o: &ColumnOverrideLock) -> Self {
        Self {
            values: o.values.clone(),
            weights: o.weights.clone(),
            null_probability: o.null_probability,
            edge_case_probability: o.edge_case_probability,
        }
    }
}

impl LockFile {
    /// Capture the options of a run.
    pub fn new(schema_hash: String, options: &GenerateOptions) -> Self {
        Self {
            schema_hash,
            seed: options.seed,
            synthseed_version: env!("CARGO_PKG_VERSION").to_string(),
            config: LockConfig {
                table_row_overrides: options.overrides.clone(),
                column_overrides: options
                    .column_overrides
                    .iter()
                    .map(|(k, v)| (k.clone(), v.into()))
                    .collect(),
                null_probability: options.null_probability,
                edge_case_probability: options.edge_case_probability,
                max_unique_retries: options.max_unique_retries,
            },
            base_time: options.base_time.format(BASE_TIME_FORMAT).to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Parse the stored base_time back to NaiveDateTime.
    pub fn parse_base_time(&self) -> Option<chrono::NaiveDateTime> {
        chrono::NaiveDateTime::parse_from_str(&self.base_time, BASE_TIME_FORMAT).ok()
    }

    /// Rebuild the run options this lock file was written from.
    pub fn to_generate_options(&self, workers: usize) -> Result<GenerateOptions> {
        let base_time = self.parse_base_time().ok_or_else(|| SynthSeedError::LockFile {
            message: format!("Invalid base_time '{}'", self.base_time),
        })?;
        Ok(GenerateOptions {
            seed: self.seed,
            overrides: self.config.table_row_overrides.clone(),
            column_overrides: self
                .config
                .column_overrides
                .iter()
                .map(|(k, v)| (k.clone(), v.into()))
                .collect(),
            workers,
            null_probability: self.config.null_probability,
            edge_case_probability: self.config.edge_case_probability,
            max_unique_retries: self.config.max_unique_retries,
            base_time,
        })
    }
}
