use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::distribution;
use crate::error::{GenerationError, Result};
use crate::generate::coerce::{coerce, decimal_places};
use crate::generate::providers::type_edge_cases;
use crate::generate::registry::{GeneratorArgs, GeneratorEntry, GeneratorRegistry};
use crate::generate::value::Value;
use crate::schema::document::GeneratorParams;
use crate::schema::types::{Column, ColumnType, DataType, TypeFamily, ValidatedSchema};

/// Default probability of a NULL in a nullable column.
pub const DEFAULT_NULL_PROBABILITY: f64 = 0.05;

/// Default probability of substituting a boundary value.
pub const DEFAULT_EDGE_CASE_PROBABILITY: f64 = 0.02;

/// Default resamples per unique value before the run fails.
pub const DEFAULT_MAX_UNIQUE_RETRIES: usize = 1000;

/// Anchor for temporal generators when none is configured.
pub fn default_base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Per-column settings supplied from outside the schema document
/// (`[columns."table.column"]` in `synthseed.toml`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnOverride {
    /// Replaces the column's generator with a weighted categorical draw.
    pub values: Option<Vec<serde_json::Value>>,
    pub weights: Option<Vec<f64>>,
    pub null_probability: Option<f64>,
    pub edge_case_probability: Option<f64>,
}

/// Knobs for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub seed: u64,
    /// Record-count overrides, keyed by table name.
    pub overrides: BTreeMap<String, usize>,
    /// Column overrides, keyed by `table.column`.
    pub column_overrides: BTreeMap<String, ColumnOverride>,
    /// Threads building candidate rows within a table.
    pub workers: usize,
    pub null_probability: f64,
    pub edge_case_probability: f64,
    pub max_unique_retries: usize,
    /// Pinned so reruns do not drift with the wall clock.
    pub base_time: NaiveDateTime,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            overrides: BTreeMap::new(),
            column_overrides: BTreeMap::new(),
            workers: 1,
            null_probability: DEFAULT_NULL_PROBABILITY,
            edge_case_probability: DEFAULT_EDGE_CASE_PROBABILITY,
            max_unique_retries: DEFAULT_MAX_UNIQUE_RETRIES,
            base_time: default_base_time(),
        }
    }
}

impl GenerateOptions {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

/// The complete generation plan for all tables.
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    pub seed: u64,
    pub base_time: NaiveDateTime,
    pub max_unique_retries: usize,
    pub workers: usize,
    /// Tables in `generation_order`.
    pub tables: Vec<TablePlan>,
}

/// Generation plan for a single table.
#[derive(Debug, Clone)]
pub struct TablePlan {
    pub name: String,
    /// Position in `generation_order`; mixed into every row's seed.
    pub position: usize,
    pub row_count: usize,
    pub columns: Vec<ColumnPlan>,
    /// Index into `columns` of the primary key.
    pub primary_key: usize,
}

/// Generation plan for a single column.
#[derive(Debug, Clone)]
pub struct ColumnPlan {
    pub name: String,
    pub column_type: ColumnType,
    pub strategy: ColumnStrategy,
    /// Zero for primary keys, foreign keys and non-nullable columns.
    pub null_probability: f64,
    /// Zero for primary keys, foreign keys and sequences.
    pub edge_case_probability: f64,
    /// Boundary values, already coerced to the column type.
    pub edge_values: Vec<Value>,
    pub unique: bool,
    pub primary_key: bool,
    /// The generator's declared `[min, max]`, narrowed to values the column
    /// can store. Coerced samples are clamped back into it.
    pub bounds: Option<(f64, f64)>,
}

impl ColumnPlan {
    /// Undo any drift out of `bounds` caused by coercion (rounding a float
    /// into an integer or decimal column).
    pub fn clamp_to_bounds(&self, value: Value) -> Value {
        let Some((lo, hi)) = self.bounds else {
            return value;
        };
        match value {
            Value::Int(i) => Value::Int(i.clamp(lo.ceil() as i64, hi.floor() as i64)),
            Value::Float(f) => Value::Float(f.clamp(lo, hi)),
            other => other,
        }
    }
}

/// How a column's value is produced.
#[derive(Debug, Clone)]
pub enum ColumnStrategy {
    /// `row_index + 1`.
    AutoIncrement,
    /// Uniform draw from a completed parent key pool.
    ForeignKey { table: String, column: String },
    /// Dispatch to a registered generator.
    Generator {
        name: String,
        params: GeneratorParams,
        entry: GeneratorEntry,
    },
    /// Type-driven fallback when no generator is declared.
    TypeDefault,
}

impl ColumnStrategy {
    pub fn label(&self) -> &str {
        match self {
            ColumnStrategy::AutoIncrement => "auto_increment",
            ColumnStrategy::ForeignKey { .. } => "foreign_key",
            ColumnStrategy::Generator { name, .. } => name,
            ColumnStrategy::TypeDefault => "type_default",
        }
    }
}

impl GenerationPlan {
    /// Resolve every table and column of a validated schema.
    ///
    /// Unknown generator names and invalid overrides fail here, before any
    /// row is produced.
    pub fn build(
        schema: &ValidatedSchema,
        registry: &GeneratorRegistry,
        options: &GenerateOptions,
    ) -> Result<Self> {
        if !(1..=9999).contains(&options.base_time.year()) {
            return Err(GenerationError::InvalidBaseTime {
                base_time: options.base_time.to_string(),
            }
            .into());
        }

        for (table, rows) in &options.overrides {
            if schema.table(table).is_none() {
                warn!("Ignoring record count override for unknown table '{}'", table);
            } else if *rows == 0 {
                return Err(GenerationError::InvalidOverride {
                    table: table.clone(),
                    rows: *rows,
                }
                .into());
            }
        }

        let mut tables = Vec::with_capacity(schema.tables.len());
        for table in schema.tables.values() {
            let row_count = options
                .overrides
                .get(&table.name)
                .copied()
                .unwrap_or(table.record_count);

            let columns = table
                .columns
                .iter()
                .map(|column| plan_column(&table.name, column, registry, options))
                .collect::<Result<Vec<_>>>()?;

            debug!(
                "Planned '{}': {} rows, strategies [{}]",
                table.name,
                row_count,
                columns
                    .iter()
                    .map(|c| format!("{}={}", c.name, c.strategy.label()))
                    .collect::<Vec<_>>()
                    .join(", ")
            );

            tables.push(TablePlan {
                name: table.name.clone(),
                position: table.position,
                row_count,
                columns,
                primary_key: table.primary_key,
            });
        }

        Ok(Self {
            seed: options.seed,
            base_time: options.base_time,
            max_unique_retries: options.max_unique_retries,
            workers: options.workers.max(1),
            tables,
        })
    }

    pub fn total_rows(&self) -> usize {
        self.tables
            .iter()
            .fold(0usize, |total, t| total.saturating_add(t.row_count))
    }
}

fn plan_column(
    table: &str,
    column: &Column,
    registry: &GeneratorRegistry,
    options: &GenerateOptions,
) -> Result<ColumnPlan> {
    let key = format!("{}.{}", table, column.name);
    let column_override = options.column_overrides.get(&key);
    let strategy = resolve_strategy(table, column, column_override, registry)?;

    let is_key = matches!(
        strategy,
        ColumnStrategy::AutoIncrement | ColumnStrategy::ForeignKey { .. }
    ) || column.primary_key;

    // Precedence: config column override > column params > run default
    let null_probability = if column.nullable && !is_key {
        column_override
            .and_then(|o| o.null_probability)
            .or(column.params.null_probability)
            .unwrap_or(options.null_probability)
    } else {
        0.0
    };

    let mut plan = ColumnPlan {
        name: column.name.clone(),
        column_type: column.column_type.clone(),
        strategy,
        null_probability,
        edge_case_probability: 0.0,
        edge_values: Vec::new(),
        unique: column.requires_unique(),
        primary_key: column.primary_key,
        bounds: None,
    };

    let bounds = match &plan.strategy {
        ColumnStrategy::Generator { params, .. } => value_bounds(params, &column.column_type)
            .map_err(|message| generator_error(table, &plan, message))?,
        _ => None,
    };
    plan.bounds = bounds;
    check_trial_sample(table, &plan, options)?;

    if !is_key {
        plan.edge_case_probability = column_override
            .and_then(|o| o.edge_case_probability)
            .or(column.params.edge_case_probability)
            .unwrap_or(options.edge_case_probability);
        plan.edge_values = edge_values(table, column, &plan, options.base_time)?;
    }

    Ok(plan)
}

/// `min`/`max` from a numeric generator's params, narrowed to what an
/// integer or fixed-scale column can hold.
fn value_bounds(
    params: &GeneratorParams,
    column_type: &ColumnType,
) -> std::result::Result<Option<(f64, f64)>, String> {
    if params.min.is_none() && params.max.is_none() {
        return Ok(None);
    }
    if !matches!(column_type.family(), TypeFamily::Integer | TypeFamily::Decimal) {
        return Ok(None);
    }
    let min = params.min.unwrap_or(f64::NEG_INFINITY);
    let max = params.max.unwrap_or(f64::INFINITY);
    match decimal_places(column_type) {
        Some(places) => distribution::inward_bounds(min, max, places)
            .map(Some)
            .ok_or_else(|| {
                format!(
                    "no {} value lies within [{}, {}]",
                    column_type.raw, min, max
                )
            }),
        None => Ok(Some((min.min(max), min.max(max)))),
    }
}

/// Draw one value before any row exists, so a generator whose output can
/// never be stored in its column fails the plan instead of the run.
fn check_trial_sample(table: &str, plan: &ColumnPlan, options: &GenerateOptions) -> Result<()> {
    let ColumnStrategy::Generator { params, entry, .. } = &plan.strategy else {
        return Ok(());
    };
    let args = GeneratorArgs {
        params,
        row_index: 0,
        base_time: options.base_time,
    };
    let mut rng = StdRng::seed_from_u64(options.seed);
    let sample = entry
        .sample(&args, &mut rng)
        .map_err(|e| generator_error(table, plan, e.to_string()))?;
    coerce(sample, &plan.column_type)
        .map(|_| ())
        .map_err(|unfit| generator_error(table, plan, unfit_message(&unfit, &plan.column_type)))
}

/// Why a value was refused by its column.
pub(crate) fn unfit_message(value: &Value, column_type: &ColumnType) -> String {
    format!("value '{}' does not fit column type {}", value, column_type.raw)
}

fn generator_error(table: &str, plan: &ColumnPlan, message: String) -> crate::error::SynthSeedError {
    GenerationError::Generator {
        table: table.to_string(),
        column: plan.name.clone(),
        generator: plan.strategy.label().to_string(),
        message,
    }
    .into()
}

fn resolve_strategy(
    table: &str,
    column: &Column,
    column_override: Option<&ColumnOverride>,
    registry: &GeneratorRegistry,
) -> Result<ColumnStrategy> {
    let is_sequence = matches!(
        column.column_type.data_type,
        DataType::Serial | DataType::BigSerial
    );
    let is_integer_key = column.primary_key
        && column.column_type.family() == TypeFamily::Integer
        && column.generator.is_none();

    if column.auto_increment || is_sequence || is_integer_key {
        return Ok(ColumnStrategy::AutoIncrement);
    }

    if let Some(fk) = &column.foreign_key {
        return Ok(ColumnStrategy::ForeignKey {
            table: fk.referenced_table.clone(),
            column: fk.referenced_column.clone(),
        });
    }

    if let Some(values) = column_override.and_then(|o| o.values.clone()) {
        let params = GeneratorParams {
            values: Some(values),
            weights: column_override.and_then(|o| o.weights.clone()),
            ..column.params.clone()
        };
        return categorical(table, column, params, registry);
    }

    match &column.generator {
        Some(name) => {
            let entry = registry
                .get(name)
                .ok_or_else(|| GenerationError::UnknownGenerator {
                    table: table.to_string(),
                    column: column.name.clone(),
                    generator: name.clone(),
                })?;
            Ok(ColumnStrategy::Generator {
                name: name.clone(),
                params: column.params.clone(),
                entry: entry.clone(),
            })
        }
        None if column.params.values.is_some() => {
            categorical(table, column, column.params.clone(), registry)
        }
        None => Ok(ColumnStrategy::TypeDefault),
    }
}

fn categorical(
    table: &str,
    column: &Column,
    params: GeneratorParams,
    registry: &GeneratorRegistry,
) -> Result<ColumnStrategy> {
    const NAME: &str = "weighted_categorical";
    let entry = registry
        .get(NAME)
        .ok_or_else(|| GenerationError::UnknownGenerator {
            table: table.to_string(),
            column: column.name.clone(),
            generator: NAME.to_string(),
        })?;
    Ok(ColumnStrategy::Generator {
        name: NAME.to_string(),
        params,
        entry: entry.clone(),
    })
}

/// Boundary values for a column: explicit `edge_values`, else the
/// generator's own, else the column type's. A boundary value the column
/// cannot store is an error.
fn edge_values(
    table: &str,
    column: &Column,
    plan: &ColumnPlan,
    base_time: NaiveDateTime,
) -> Result<Vec<Value>> {
    let candidates: Vec<Value> = match (&column.params.edge_values, &plan.strategy) {
        (Some(explicit), _) => explicit.iter().map(Value::from_json).collect(),
        (None, ColumnStrategy::Generator { params, entry, .. }) => {
            let args = GeneratorArgs {
                params,
                row_index: 0,
                base_time,
            };
            entry.edge_cases(&args)
        }
        _ => Vec::new(),
    };

    let mut coerced = Vec::with_capacity(candidates.len());
    for candidate in candidates.into_iter().filter(|v| !v.is_null()) {
        let value = coerce(candidate, &column.column_type).map_err(|unfit| {
            let message = format!("edge {}", unfit_message(&unfit, &column.column_type));
            generator_error(table, plan, message)
        })?;
        coerced.push(value);
    }

    if coerced.is_empty() {
        coerced = type_edge_cases(&column.column_type);
    }
    let mut coerced: Vec<Value> = coerced
        .into_iter()
        .map(|v| plan.clamp_to_bounds(v))
        .collect();
    coerced.dedup();
    Ok(coerced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::document::RawSchema;
    use crate::schema::validate::validate;
    use serde_json::json;

    fn lending_schema() -> ValidatedSchema {
        let raw: RawSchema = serde_json::from_value(json!({
            "name": "lending",
            "database_type": ["postgresql"],
            "tables": [
                {
                    "name": "borrowers",
                    "record_count": 10,
                    "columns": [
                        {"name": "id", "type": "SERIAL", "primary_key": true},
                        {"name": "email", "type": "VARCHAR(120)", "generator": "email", "unique": true},
                        {"name": "score", "type": "INTEGER", "generator": "credit_score",
                         "generator_params": {"edge_case_probability": 0.5}},
                        {"name": "middle_name", "type": "VARCHAR(40)", "nullable": true,
                         "generator_params": {"null_probability": 0.3}},
                        {"name": "tier", "type": "TEXT",
                         "generator_params": {"values": ["gold", "silver"], "weights": [1, 3]}}
                    ]
                },
                {
                    "name": "loans",
                    "record_count": 20,
                    "columns": [
                        {"name": "id", "type": "UUID", "primary_key": true, "generator": "uuid"},
                        {"name": "borrower_id", "type": "INTEGER", "nullable": true,
                         "foreign_key": {"table": "borrowers", "column": "id"}},
                        {"name": "note", "type": "TEXT", "nullable": true}
                    ]
                }
            ],
            "generation_order": ["borrowers", "loans"]
        }))
        .unwrap();
        validate(&raw).unwrap()
    }

    fn column<'a>(plan: &'a GenerationPlan, table: &str, column: &str) -> &'a ColumnPlan {
        plan.tables
            .iter()
            .find(|t| t.name == table)
            .and_then(|t| t.columns.iter().find(|c| c.name == column))
            .unwrap()
    }

    #[test]
    fn test_strategies_resolve_by_precedence() {
        let schema = lending_schema();
        let registry = GeneratorRegistry::with_builtins();
        let plan = GenerationPlan::build(&schema, &registry, &GenerateOptions::default()).unwrap();

        assert!(matches!(
            column(&plan, "borrowers", "id").strategy,
            ColumnStrategy::AutoIncrement
        ));
        assert!(matches!(
            &column(&plan, "borrowers", "tier").strategy,
            ColumnStrategy::Generator { name, .. } if name == "weighted_categorical"
        ));
        assert!(matches!(
            &column(&plan, "loans", "borrower_id").strategy,
            ColumnStrategy::ForeignKey { table, column } if table == "borrowers" && column == "id"
        ));
        assert!(matches!(
            &column(&plan, "loans", "id").strategy,
            ColumnStrategy::Generator { name, .. } if name == "uuid"
        ));
        assert!(matches!(
            column(&plan, "loans", "note").strategy,
            ColumnStrategy::TypeDefault
        ));
    }

    #[test]
    fn test_keys_never_receive_nulls_or_edge_cases() {
        let schema = lending_schema();
        let registry = GeneratorRegistry::with_builtins();
        let plan = GenerationPlan::build(&schema, &registry, &GenerateOptions::default()).unwrap();

        for (table, name) in [("borrowers", "id"), ("loans", "id"), ("loans", "borrower_id")] {
            let c = column(&plan, table, name);
            assert_eq!(c.null_probability, 0.0, "{}.{}", table, name);
            assert_eq!(c.edge_case_probability, 0.0, "{}.{}", table, name);
        }
        assert!(column(&plan, "loans", "id").unique);
    }

    #[test]
    fn test_probability_precedence() {
        let schema = lending_schema();
        let registry = GeneratorRegistry::with_builtins();
        let mut options = GenerateOptions::default();
        options.column_overrides.insert(
            "borrowers.middle_name".to_string(),
            ColumnOverride {
                null_probability: Some(0.9),
                ..ColumnOverride::default()
            },
        );
        let plan = GenerationPlan::build(&schema, &registry, &options).unwrap();

        assert_eq!(column(&plan, "borrowers", "middle_name").null_probability, 0.9);
        assert_eq!(column(&plan, "loans", "note").null_probability, DEFAULT_NULL_PROBABILITY);
        assert_eq!(column(&plan, "borrowers", "email").null_probability, 0.0);
        assert_eq!(column(&plan, "borrowers", "score").edge_case_probability, 0.5);
        assert_eq!(
            column(&plan, "loans", "note").edge_case_probability,
            DEFAULT_EDGE_CASE_PROBABILITY
        );
    }

    #[test]
    fn test_generator_edge_values_are_coerced() {
        let schema = lending_schema();
        let registry = GeneratorRegistry::with_builtins();
        let plan = GenerationPlan::build(&schema, &registry, &GenerateOptions::default()).unwrap();

        let edges = &column(&plan, "borrowers", "score").edge_values;
        assert!(edges.contains(&Value::Int(300)), "{:?}", edges);
        assert!(edges.contains(&Value::Int(850)), "{:?}", edges);
        assert!(edges.iter().all(|v| matches!(v, Value::Int(_))));
    }

    #[test]
    fn test_column_override_values_replace_generator() {
        let schema = lending_schema();
        let registry = GeneratorRegistry::with_builtins();
        let mut options = GenerateOptions::default();
        options.column_overrides.insert(
            "borrowers.score".to_string(),
            ColumnOverride {
                values: Some(vec![json!(500), json!(700)]),
                weights: Some(vec![1.0, 1.0]),
                ..ColumnOverride::default()
            },
        );
        let plan = GenerationPlan::build(&schema, &registry, &options).unwrap();

        match &column(&plan, "borrowers", "score").strategy {
            ColumnStrategy::Generator { name, params, .. } => {
                assert_eq!(name, "weighted_categorical");
                assert_eq!(params.values.as_ref().map(|v| v.len()), Some(2));
            }
            other => panic!("unexpected strategy {:?}", other),
        }
    }

    #[test]
    fn test_record_count_overrides() {
        let schema = lending_schema();
        let registry = GeneratorRegistry::with_builtins();
        let mut options = GenerateOptions::default();
        options.overrides.insert("loans".to_string(), 5);
        options.overrides.insert("ghosts".to_string(), 3);
        let plan = GenerationPlan::build(&schema, &registry, &options).unwrap();

        assert_eq!(plan.tables[0].row_count, 10);
        assert_eq!(plan.tables[1].row_count, 5);
        assert_eq!(plan.total_rows(), 15);

        options.overrides.insert("loans".to_string(), 0);
        let err = GenerationPlan::build(&schema, &registry, &options).unwrap_err();
        assert!(err.to_string().contains("'loans'"), "{}", err);
    }

    #[test]
    fn test_base_time_outside_calendar_years_is_rejected() {
        let schema = lending_schema();
        let registry = GeneratorRegistry::with_builtins();
        let mut options = GenerateOptions::default();
        options.base_time = NaiveDate::from_ymd_opt(-40_000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let err = GenerationPlan::build(&schema, &registry, &options).unwrap_err();
        assert!(matches!(
            err,
            crate::error::SynthSeedError::Generation(GenerationError::InvalidBaseTime { .. })
        ));
    }

    #[test]
    fn test_integer_bounds_follow_generator_range() {
        let raw: RawSchema = serde_json::from_value(json!({
            "name": "s",
            "database_type": ["sqlite"],
            "tables": [{
                "name": "t",
                "record_count": 1,
                "columns": [
                    {"name": "id", "type": "INTEGER", "primary_key": true},
                    {"name": "x", "type": "INTEGER", "generator": "uniform_float",
                     "generator_params": {"min": 0.5, "max": 3.5}},
                    {"name": "y", "type": "INTEGER", "generator": "uniform_float",
                     "generator_params": {"min": 0.2, "max": 0.8}}
                ]
            }],
            "generation_order": ["t"]
        }))
        .unwrap();
        let registry = GeneratorRegistry::with_builtins();
        let schema = validate(&raw).unwrap();
        let err = GenerationPlan::build(&schema, &registry, &GenerateOptions::default()).unwrap_err();
        assert!(err.to_string().contains("t.y"), "{}", err);

        let mut raw = raw;
        raw.tables[0].columns.pop();
        let schema = validate(&raw).unwrap();
        let plan = GenerationPlan::build(&schema, &registry, &GenerateOptions::default()).unwrap();
        let x = column(&plan, "t", "x");
        assert_eq!(x.bounds, Some((1.0, 3.0)));
        assert_eq!(x.edge_values, vec![Value::Int(1), Value::Int(3)]);
    }

    #[test]
    fn test_unknown_generator_aborts_planning() {
        let raw: RawSchema = serde_json::from_value(json!({
            "name": "s",
            "database_type": ["sqlite"],
            "tables": [{
                "name": "t",
                "record_count": 1,
                "columns": [
                    {"name": "id", "type": "INTEGER", "primary_key": true},
                    {"name": "x", "type": "TEXT", "generator": "horoscope"}
                ]
            }],
            "generation_order": ["t"]
        }))
        .unwrap();
        let schema = validate(&raw).unwrap();
        let registry = GeneratorRegistry::with_builtins();
        let err = GenerationPlan::build(&schema, &registry, &GenerateOptions::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("horoscope") && msg.contains("t.x"), "{}", msg);
    }
}
