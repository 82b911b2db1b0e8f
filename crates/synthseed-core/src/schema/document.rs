//! # Schema Document
//!
//! The serde model of a schema document as it is written on disk. Nothing
//! here is trusted: every field defaults to empty/zero when absent so that a
//! missing `name` or `record_count` surfaces as a precise validation error
//! instead of an opaque parse failure. See [`crate::schema::validate`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SynthSeedError};

/// A schema document exactly as loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSchema {
    pub schema_version: String,
    pub name: String,
    pub description: String,
    /// Database compatibility tags. Accepts a single string or a list.
    #[serde(deserialize_with = "one_or_many")]
    pub database_type: Vec<String>,
    pub tables: Vec<RawTable>,
    /// Human-readable FK documentation. Redundant with inline foreign keys
    /// and never enforced.
    pub relationships: Vec<RawRelationship>,
    pub generation_order: Vec<String>,
    /// Advisory rules carried through untouched.
    pub validation_rules: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTable {
    pub name: String,
    pub description: String,
    pub record_count: i64,
    pub columns: Vec<RawColumn>,
    pub indexes: Vec<RawIndex>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub description: String,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub nullable: bool,
    pub unique: bool,
    pub generator: Option<String>,
    pub generator_params: Option<GeneratorParams>,
    pub foreign_key: Option<RawForeignKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawForeignKey {
    #[serde(alias = "referenced_table", alias = "references_table")]
    pub table: String,
    #[serde(alias = "referenced_column", alias = "references_column")]
    pub column: String,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawIndex {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRelationship {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Per-column generator parameters.
///
/// A flat bag shared by every generator; each generator reads the keys it
/// understands. Keys no built-in generator knows are kept in `extra` so
/// registered custom generators can read them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorParams {
    /// Distribution kind for the generic `distribution` generator:
    /// `normal`, `lognormal`, `weighted_categorical`, `weighted_range`,
    /// `uniform`.
    pub distribution: Option<String>,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub median: Option<f64>,
    /// Explicit log-space spread for `lognormal`; derived from `median` and
    /// `max` when absent.
    pub sigma: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub values: Option<Vec<serde_json::Value>>,
    pub weights: Option<Vec<f64>>,
    /// `[min, max)` pairs for `weighted_range`.
    pub ranges: Option<Vec<[f64; 2]>>,
    /// Decimal places kept on float samples.
    pub precision: Option<u32>,
    /// Probability of `true` for `boolean`.
    pub probability: Option<f64>,
    pub days_back: Option<i64>,
    pub days_forward: Option<i64>,
    pub prefix: Option<String>,
    pub null_probability: Option<f64>,
    pub edge_case_probability: Option<f64>,
    /// Explicit edge-case values, replacing the generator's own boundaries.
    pub edge_values: Option<Vec<serde_json::Value>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RawSchema {
    /// Parse a schema document from a JSON string.
    pub fn from_json_str(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

/// Read and parse a schema document from disk.
pub fn load_schema(path: &Path) -> Result<RawSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| SynthSeedError::Schema {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    RawSchema::from_json_str(&content).map_err(|e| SynthSeedError::Schema {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}
