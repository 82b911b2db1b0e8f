//! # Configuration File Parser
//!
//! Reads and parses `synthseed.toml`, the optional file that tunes a
//! generation run without editing the schema document. Supports:
//!
//! - `[generate]`: seed, injection rates, retry limit, workers, base time
//! - `[tables.<name>]`: per-table record count overrides
//! - `[columns."<table>.<column>"]`: value lists, weights, injection rates
//!
//! Example `synthseed.toml`:
//!
//! ```toml
//! [generate]
//! seed = 42
//! null_probability = 0.05
//! edge_case_probability = 0.02
//! workers = 4
//! base_time = "2025-01-01T00:00:00"
//!
//! [tables.loans]
//! rows = 5000
//!
//! [columns."loans.status"]
//! values = ["current", "late", "default"]
//! weights = [85, 10, 5]
//!
//! [columns."borrowers.middle_name"]
//! null_probability = 0.4
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::error::{Result, SynthSeedError};
use crate::generate::plan::{
    default_base_time, ColumnOverride, GenerateOptions, DEFAULT_EDGE_CASE_PROBABILITY,
    DEFAULT_MAX_UNIQUE_RETRIES, DEFAULT_NULL_PROBABILITY,
};
use crate::schema::types::ValidatedSchema;

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "synthseed.toml";

/// Accepted `base_time` formats.
const BASE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Top-level synthseed.toml structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SynthSeedConfig {
    /// Run-wide generation settings.
    pub generate: GenerateConfig,
    /// Per-table overrides, keyed by table name.
    pub tables: BTreeMap<String, TableConfig>,
    /// Per-column overrides, keyed by "table.column".
    pub columns: BTreeMap<String, ColumnConfig>,
}

/// Run-wide generation settings. Unset fields fall back to the engine
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub seed: Option<u64>,
    pub null_probability: Option<f64>,
    pub edge_case_probability: Option<f64>,
    pub max_unique_retries: Option<usize>,
    pub workers: Option<usize>,
    /// ISO-8601 anchor for temporal generators.
    pub base_time: Option<String>,
}

/// Per-table configuration override.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Number of rows to generate for this table.
    pub rows: Option<usize>,
}

/// Per-column configuration override.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Fixed list of values to pick from, replacing the column's generator.
    pub values: Option<Vec<serde_json::Value>>,
    /// Weights for each value (must be same length as `values`).
    pub weights: Option<Vec<f64>>,
    pub null_probability: Option<f64>,
    pub edge_case_probability: Option<f64>,
}

/// Read and parse a synthseed.toml file from the given directory.
///
/// Returns `None` if the file doesn't exist (config is optional).
/// Returns an error if the file exists but can't be parsed or validated.
pub fn read_config(dir: &Path) -> Result<Option<SynthSeedConfig>> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| SynthSeedError::Config {
        message: format!("Failed to read {}: {}", path.display(), e),
    })?;

    let config = SynthSeedConfig::from_toml_str(&content).map_err(|e| match e {
        SynthSeedError::Config { message } => SynthSeedError::Config {
            message: format!("{}: {}", path.display(), message),
        },
        other => other,
    })?;

    tracing::debug!("Loaded {}", path.display());
    Ok(Some(config))
}

impl SynthSeedConfig {
    /// Parse and validate a config document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SynthSeedConfig =
            toml::from_str(content).map_err(|e| SynthSeedError::Config {
                message: format!("Failed to parse config: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Build record count overrides from the `[tables]` section.
    pub fn table_row_overrides(&self) -> BTreeMap<String, usize> {
        self.tables
            .iter()
            .filter_map(|(name, tc)| tc.rows.map(|rows| (name.clone(), rows)))
            .collect()
    }

    /// Column overrides keyed by `table.column`.
    pub fn column_overrides(&self) -> BTreeMap<String, ColumnOverride> {
        self.columns
            .iter()
            .map(|(key, cfg)| {
                (
                    key.clone(),
                    ColumnOverride {
                        values: cfg.values.clone(),
                        weights: cfg.weights.clone(),
                        null_probability: cfg.null_probability,
                        edge_case_probability: cfg.edge_case_probability,
                    },
                )
            })
            .collect()
    }

    /// The configured `base_time`, if any.
    pub fn base_time(&self) -> Result<Option<NaiveDateTime>> {
        self.generate
            .base_time
            .as_deref()
            .map(parse_base_time)
            .transpose()
    }

    /// Engine options with every unset field at its default. Callers layer
    /// CLI flags on top.
    pub fn to_generate_options(&self) -> Result<GenerateOptions> {
        let g = &self.generate;
        Ok(GenerateOptions {
            seed: g.seed.unwrap_or_default(),
            overrides: self.table_row_overrides(),
            column_overrides: self.column_overrides(),
            workers: g.workers.unwrap_or(1),
            null_probability: g.null_probability.unwrap_or(DEFAULT_NULL_PROBABILITY),
            edge_case_probability: g
                .edge_case_probability
                .unwrap_or(DEFAULT_EDGE_CASE_PROBABILITY),
            max_unique_retries: g.max_unique_retries.unwrap_or(DEFAULT_MAX_UNIQUE_RETRIES),
            base_time: self.base_time()?.unwrap_or_else(default_base_time),
        })
    }

    /// Validate semantic constraints that serde cannot enforce.
    pub fn validate(&self) -> Result<()> {
        let g = &self.generate;
        check_probability("generate.null_probability", g.null_probability)?;
        check_probability("generate.edge_case_probability", g.edge_case_probability)?;
        if g.workers == Some(0) {
            return Err(config_error("generate.workers must be at least 1"));
        }
        self.base_time()?;

        for (name, tc) in &self.tables {
            if tc.rows == Some(0) {
                return Err(config_error(format!(
                    "tables.{}.rows must be a positive integer",
                    name
                )));
            }
        }

        for (key, col_cfg) in &self.columns {
            check_probability(
                &format!("columns.\"{}\".null_probability", key),
                col_cfg.null_probability,
            )?;
            check_probability(
                &format!("columns.\"{}\".edge_case_probability", key),
                col_cfg.edge_case_probability,
            )?;

            if let Some(ref values) = col_cfg.values {
                if values.is_empty() {
                    return Err(config_error(format!(
                        "Column '{}': values must not be empty",
                        key
                    )));
                }
            }

            if let Some(ref weights) = col_cfg.weights {
                match col_cfg.values {
                    Some(ref values) => {
                        if values.len() != weights.len() {
                            return Err(config_error(format!(
                                "Column '{}': weights has {} entries but values has {} entries. \
                                 They must be the same length.",
                                key,
                                weights.len(),
                                values.len(),
                            )));
                        }
                    }
                    None => {
                        return Err(config_error(format!(
                            "Column '{}': weights provided without values. \
                             Add a matching values list or remove the weights.",
                            key,
                        )));
                    }
                }
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(config_error(format!(
                        "Column '{}': weights must be non-negative numbers",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    /// Check overrides against a validated schema.
    ///
    /// Returns a warning for each override naming a table or column the
    /// schema does not define. Never fatal.
    pub fn validate_against_schema(&self, schema: &ValidatedSchema) -> Vec<String> {
        let mut warnings = Vec::new();
        for table in self.tables.keys() {
            if schema.table(table).is_none() {
                warnings.push(format!(
                    "{}: [tables.{}] references a table which does not exist in schema",
                    CONFIG_FILE_NAME, table
                ));
            }
        }
        for key in self.columns.keys() {
            if let Some((table, col)) = key.split_once('.') {
                if let Some(table_def) = schema.table(table) {
                    if table_def.column(col).is_none() {
                        warnings.push(format!(
                            "{}: [columns.\"{}\"] references column '{}' \
                             which does not exist in table '{}'",
                            CONFIG_FILE_NAME, key, col, table
                        ));
                    }
                } else {
                    warnings.push(format!(
                        "{}: [columns.\"{}\"] references table '{}' \
                         which does not exist in schema",
                        CONFIG_FILE_NAME, key, table
                    ));
                }
            } else {
                warnings.push(format!(
                    "{}: [columns.\"{}\"] is not in 'table.column' format",
                    CONFIG_FILE_NAME, key
                ));
            }
        }
        warnings
    }
}

/// Parse an ISO-8601 `base_time`, with or without the `T` separator.
pub fn parse_base_time(s: &str) -> Result<NaiveDateTime> {
    BASE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok())
        .ok_or_else(|| {
            config_error(format!(
                "base_time '{}' is not an ISO-8601 date-time (expected YYYY-MM-DDTHH:MM:SS)",
                s
            ))
        })
}

fn check_probability(field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(p) if !(0.0..=1.0).contains(&p) => Err(config_error(format!(
            "{} must be between 0 and 1, got {}",
            field, p
        ))),
        _ => Ok(()),
    }
}

fn config_error(message: impl Into<String>) -> SynthSeedError {
    SynthSeedError::Config {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::document::RawSchema;
    use crate::schema::validate::validate;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[generate]
seed = 42
null_probability = 0.1
edge_case_probability = 0.0
max_unique_retries = 50
workers = 4
base_time = "2024-06-01T12:00:00"

[tables.borrowers]
rows = 1000

[tables.loans]
rows = 5000

[columns."loans.status"]
values = ["current", "late", "default"]
weights = [85, 10, 5]

[columns."borrowers.middle_name"]
null_probability = 0.4
"#;

        let config = SynthSeedConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.generate.seed, Some(42));
        assert_eq!(config.tables["loans"].rows, Some(5000));
        assert_eq!(config.columns["loans.status"].values.as_ref().unwrap().len(), 3);

        let options = config.to_generate_options().unwrap();
        assert_eq!(options.seed, 42);
        assert_eq!(options.workers, 4);
        assert_eq!(options.null_probability, 0.1);
        assert_eq!(options.edge_case_probability, 0.0);
        assert_eq!(options.max_unique_retries, 50);
        assert_eq!(options.overrides["borrowers"], 1000);
        assert_eq!(
            options.base_time,
            parse_base_time("2024-06-01 12:00:00").unwrap()
        );
        assert_eq!(
            options.column_overrides["borrowers.middle_name"].null_probability,
            Some(0.4)
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SynthSeedConfig::from_toml_str("").unwrap();
        let options = config.to_generate_options().unwrap();
        assert_eq!(options.null_probability, DEFAULT_NULL_PROBABILITY);
        assert_eq!(options.edge_case_probability, DEFAULT_EDGE_CASE_PROBABILITY);
        assert_eq!(options.max_unique_retries, DEFAULT_MAX_UNIQUE_RETRIES);
        assert_eq!(options.workers, 1);
        assert_eq!(options.base_time, default_base_time());
        assert!(options.overrides.is_empty());
    }

    #[test]
    fn test_table_row_overrides_skip_unset() {
        let toml = r#"
[tables.users]
rows = 1000

[tables.products]
"#;
        let config = SynthSeedConfig::from_toml_str(toml).unwrap();
        let overrides = config.table_row_overrides();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides["users"], 1000);
    }

    #[test]
    fn test_rejects_out_of_range_probability() {
        let err = SynthSeedConfig::from_toml_str("[generate]\nnull_probability = 1.5\n")
            .unwrap_err()
            .to_string();
        assert!(err.contains("generate.null_probability"), "{}", err);

        let err = SynthSeedConfig::from_toml_str(
            "[columns.\"t.c\"]\nedge_case_probability = -0.1\n",
        )
        .unwrap_err()
        .to_string();
        assert!(err.contains("t.c"), "{}", err);
    }

    #[test]
    fn test_rejects_zero_workers_and_rows() {
        assert!(SynthSeedConfig::from_toml_str("[generate]\nworkers = 0\n").is_err());
        assert!(SynthSeedConfig::from_toml_str("[tables.users]\nrows = 0\n").is_err());
    }

    #[test]
    fn test_rejects_bad_base_time() {
        let err = SynthSeedConfig::from_toml_str("[generate]\nbase_time = \"yesterday\"\n")
            .unwrap_err()
            .to_string();
        assert!(err.contains("yesterday"), "{}", err);
    }

    #[test]
    fn test_mismatched_values_weights_fails() {
        let toml = r#"
[columns."products.color"]
values = ["red", "blue", "green", "black", "white"]
weights = [0.25, 0.20, 0.20, 0.20]
"#;
        let msg = SynthSeedConfig::from_toml_str(toml).unwrap_err().to_string();
        assert!(msg.contains("products.color"), "{}", msg);
        assert!(msg.contains('5') && msg.contains('4'), "{}", msg);
    }

    #[test]
    fn test_weights_without_values_fails() {
        let toml = r#"
[columns."orders.status"]
weights = [0.5, 0.3, 0.2]
"#;
        let msg = SynthSeedConfig::from_toml_str(toml).unwrap_err().to_string();
        assert!(msg.contains("orders.status"), "{}", msg);
    }

    #[test]
    fn test_read_config_nonexistent() {
        let result = read_config(Path::new("/nonexistent/dir")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_read_config_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[generate]\nseed = 7\n\n[tables.loans]\nrows = 20\n",
        )
        .unwrap();

        let config = read_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.generate.seed, Some(7));
        assert_eq!(config.table_row_overrides()["loans"], 20);
    }

    #[test]
    fn test_read_config_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "this is not valid [[[toml").unwrap();
        let err = read_config(dir.path()).unwrap_err().to_string();
        assert!(err.contains(CONFIG_FILE_NAME), "{}", err);
    }

    #[test]
    fn test_validate_against_schema_warnings() {
        let raw: RawSchema = serde_json::from_value(serde_json::json!({
            "name": "s",
            "database_type": ["postgresql"],
            "tables": [{
                "name": "users",
                "record_count": 5,
                "columns": [
                    {"name": "id", "type": "SERIAL", "primary_key": true},
                    {"name": "email", "type": "TEXT"}
                ]
            }],
            "generation_order": ["users"]
        }))
        .unwrap();
        let schema = validate(&raw).unwrap();

        let toml = r#"
[tables.ghosts]
rows = 3

[columns."users.email"]
values = ["a@b.com"]

[columns."users.nonexistent"]
null_probability = 0.2

[columns."orders.total"]
null_probability = 0.2

[columns.bare]
null_probability = 0.2
"#;
        let config = SynthSeedConfig::from_toml_str(toml).unwrap();
        let warnings = config.validate_against_schema(&schema);
        assert_eq!(warnings.len(), 4, "{:?}", warnings);
        assert!(warnings.iter().any(|w| w.contains("ghosts")));
        assert!(warnings.iter().any(|w| w.contains("nonexistent")));
        assert!(warnings.iter().any(|w| w.contains("orders")));
        assert!(warnings.iter().any(|w| w.contains("'table.column'")));
    }
}
