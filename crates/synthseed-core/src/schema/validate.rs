//! # Schema Validator
//!
//! Turns a [`RawSchema`] into a [`ValidatedSchema`] or the first
//! [`ValidationError`] found. Checks run in a fixed order and stop at the
//! first failure:
//!
//! 1. top-level fields (name, tables, database types)
//! 2. every table (name, duplicates, columns, record count, primary key)
//! 3. every column (name, duplicates, type, generator parameters)
//! 4. every foreign key (referenced table/column, actions)
//! 5. `generation_order` (membership, then parents-before-children)
//!
//! Problems that do not affect generation, like `relationships[]`
//! disagreeing with inline foreign keys, are returned as warnings on the
//! validated schema instead.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::error::{ErrorLocation, ValidationError, ValidationErrorKind};
use crate::graph::DependencyGraph;
use crate::schema::document::{GeneratorParams, RawColumn, RawSchema};
use crate::schema::types::{
    Column, ColumnType, DatabaseType, ForeignKey, ForeignKeyAction, Table, TypeFamily,
    ValidatedSchema,
};

type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Widest `days_back` / `days_forward` accepted: about a thousand years.
pub const MAX_DAY_WINDOW: i64 = 365_250;

/// Validate a schema document.
pub fn validate(raw: &RawSchema) -> ValidationResult<ValidatedSchema> {
    let mut warnings = Vec::new();

    let database_types = check_top_level(raw, &mut warnings)?;
    check_tables(raw)?;
    let column_types = check_columns(raw)?;
    let foreign_keys = check_foreign_keys(raw)?;
    let positions = check_generation_order(raw)?;

    check_relationships(raw, &mut warnings);

    let mut tables = IndexMap::with_capacity(raw.tables.len());
    for name in &raw.generation_order {
        let table_index = raw
            .tables
            .iter()
            .position(|t| &t.name == name)
            .unwrap_or_default();
        let raw_table = &raw.tables[table_index];

        let unique_from_indexes = unique_index_columns(raw, table_index, &mut warnings);

        let columns: Vec<Column> = raw_table
            .columns
            .iter()
            .enumerate()
            .map(|(ci, c)| Column {
                name: c.name.clone(),
                column_type: column_types[table_index][ci].clone(),
                primary_key: c.primary_key,
                auto_increment: c.auto_increment,
                nullable: c.nullable,
                unique: c.unique || unique_from_indexes.contains(c.name.as_str()),
                generator: c
                    .generator
                    .as_ref()
                    .map(|g| g.trim().to_string())
                    .filter(|g| !g.is_empty()),
                params: c.generator_params.clone().unwrap_or_default(),
                foreign_key: foreign_keys
                    .get(&(table_index, ci))
                    .map(|(table, column, on_delete, on_update)| ForeignKey {
                        referenced_table: table.clone(),
                        referenced_column: column.clone(),
                        referenced_position: positions[table.as_str()],
                        on_delete: *on_delete,
                        on_update: *on_update,
                    }),
            })
            .collect();

        let primary_key = columns.iter().position(|c| c.primary_key).unwrap_or_default();

        tables.insert(
            name.clone(),
            Table {
                name: name.clone(),
                description: raw_table.description.clone(),
                record_count: raw_table.record_count as usize,
                position: positions[name.as_str()],
                columns,
                primary_key,
            },
        );
    }

    for warning in &warnings {
        tracing::warn!("{}", warning);
    }
    tracing::debug!(
        "Validated schema '{}': {} tables",
        raw.name.trim(),
        tables.len()
    );

    Ok(ValidatedSchema {
        name: raw.name.trim().to_string(),
        version: raw.schema_version.clone(),
        description: raw.description.clone(),
        database_types,
        tables,
        generation_order: raw.generation_order.clone(),
        warnings,
    })
}

fn schema_error(kind: ValidationErrorKind) -> ValidationError {
    ValidationError::new(ErrorLocation::schema(), kind)
}

/// Step 1: name, at least one table, at least one supported database type.
fn check_top_level(
    raw: &RawSchema,
    warnings: &mut Vec<String>,
) -> ValidationResult<Vec<DatabaseType>> {
    if raw.name.trim().is_empty() {
        return Err(schema_error(ValidationErrorKind::MissingSchemaName));
    }
    if raw.tables.is_empty() {
        return Err(schema_error(ValidationErrorKind::NoTables));
    }
    if raw.database_type.is_empty() {
        return Err(schema_error(ValidationErrorKind::NoDatabaseType));
    }

    let mut supported = Vec::new();
    let mut unsupported = Vec::new();
    for tag in &raw.database_type {
        match DatabaseType::parse(tag) {
            Some(db) if !supported.contains(&db) => supported.push(db),
            Some(_) => {}
            None => unsupported.push(tag.as_str()),
        }
    }

    if supported.is_empty() {
        return Err(schema_error(ValidationErrorKind::UnsupportedDatabaseTypes {
            values: unsupported.join(", "),
        }));
    }
    if !unsupported.is_empty() {
        warnings.push(format!(
            "ignoring unsupported database_type entries: {}",
            unsupported.join(", ")
        ));
    }

    Ok(supported)
}

/// Step 2: per-table structure.
fn check_tables(raw: &RawSchema) -> ValidationResult<()> {
    let mut seen = HashSet::new();

    for (ti, table) in raw.tables.iter().enumerate() {
        let location = ErrorLocation::table(ti, &table.name);
        let fail = |kind| Err(ValidationError::new(location.clone(), kind));

        if table.name.trim().is_empty() {
            return fail(ValidationErrorKind::EmptyTableName);
        }
        if !seen.insert(table.name.as_str()) {
            return fail(ValidationErrorKind::DuplicateTable {
                name: table.name.clone(),
            });
        }
        if table.columns.is_empty() {
            return fail(ValidationErrorKind::NoColumns);
        }
        if table.record_count <= 0 {
            return fail(ValidationErrorKind::NonPositiveRecordCount {
                value: table.record_count,
            });
        }

        let primary_keys: Vec<&str> = table
            .columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect();
        match primary_keys.len() {
            0 => return fail(ValidationErrorKind::NoPrimaryKey),
            1 => {}
            count => {
                return fail(ValidationErrorKind::MultiplePrimaryKeys {
                    count,
                    columns: primary_keys.join(", "),
                })
            }
        }
    }

    Ok(())
}

/// Step 3: per-column structure. Returns the parsed type of every column,
/// indexed `[table][column]`.
fn check_columns(raw: &RawSchema) -> ValidationResult<Vec<Vec<ColumnType>>> {
    let mut all_types = Vec::with_capacity(raw.tables.len());

    for (ti, table) in raw.tables.iter().enumerate() {
        let mut seen = HashSet::new();
        let mut types = Vec::with_capacity(table.columns.len());

        for (ci, column) in table.columns.iter().enumerate() {
            let location = ErrorLocation::column(ti, &table.name, ci, &column.name);
            let fail = |kind| Err(ValidationError::new(location.clone(), kind));

            if column.name.trim().is_empty() {
                return fail(ValidationErrorKind::EmptyColumnName);
            }
            if !seen.insert(column.name.as_str()) {
                return fail(ValidationErrorKind::DuplicateColumn {
                    name: column.name.clone(),
                });
            }

            let Some(column_type) = ColumnType::parse(&column.data_type) else {
                return fail(ValidationErrorKind::UnknownDataType {
                    declared: column.data_type.clone(),
                });
            };
            if column_type.family() == TypeFamily::Enum
                && column_type.enum_values.is_empty()
                && !has_values(column)
            {
                return fail(ValidationErrorKind::EmptyEnum {
                    declared: column.data_type.clone(),
                });
            }

            if let Some(params) = &column.generator_params {
                if let Err(reason) = check_params(params) {
                    return fail(ValidationErrorKind::InvalidGeneratorParams { reason });
                }
            }

            types.push(column_type);
        }

        all_types.push(types);
    }

    Ok(all_types)
}

fn has_values(column: &RawColumn) -> bool {
    column
        .generator_params
        .as_ref()
        .and_then(|p| p.values.as_ref())
        .is_some_and(|v| !v.is_empty())
}

/// Sanity checks on generator parameters that no sampler could recover
/// from meaningfully.
fn check_params(params: &GeneratorParams) -> std::result::Result<(), String> {
    for (name, value) in [
        ("null_probability", params.null_probability),
        ("edge_case_probability", params.edge_case_probability),
        ("probability", params.probability),
    ] {
        if let Some(p) = value {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{} must be between 0 and 1, got {}", name, p));
            }
        }
    }

    if let (Some(min), Some(max)) = (params.min, params.max) {
        if min > max {
            return Err(format!("min ({}) is greater than max ({})", min, max));
        }
    }
    if let Some(std_dev) = params.std_dev {
        if !std_dev.is_finite() || std_dev < 0.0 {
            return Err(format!("std_dev must be non-negative, got {}", std_dev));
        }
    }
    if let Some(median) = params.median {
        if !median.is_finite() || median <= 0.0 {
            return Err(format!("median must be positive, got {}", median));
        }
    }

    if let Some(weights) = &params.weights {
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("weights must be non-negative numbers".to_string());
        }
        if !weights.is_empty() && weights.iter().all(|w| *w == 0.0) {
            return Err("at least one weight must be positive".to_string());
        }
        let targets = params
            .values
            .as_ref()
            .map(|v| ("values", v.len()))
            .or_else(|| params.ranges.as_ref().map(|r| ("ranges", r.len())));
        match targets {
            Some((name, len)) if len != weights.len() => {
                return Err(format!(
                    "{} has {} entries but weights has {}",
                    name,
                    len,
                    weights.len()
                ));
            }
            Some(_) => {}
            None => return Err("weights given without values or ranges".to_string()),
        }
    }

    for (name, value) in [
        ("days_back", params.days_back),
        ("days_forward", params.days_forward),
    ] {
        if let Some(days) = value {
            if !(0..=MAX_DAY_WINDOW).contains(&days) {
                return Err(format!(
                    "{} must be between 0 and {}, got {}",
                    name, MAX_DAY_WINDOW, days
                ));
            }
        }
    }

    if let Some(ranges) = &params.ranges {
        if ranges.is_empty() {
            return Err("ranges must not be empty".to_string());
        }
        if let Some([lo, hi]) = ranges.iter().find(|[lo, hi]| lo > hi) {
            return Err(format!("range [{}, {}] has min greater than max", lo, hi));
        }
    }

    if let Some(values) = &params.values {
        if values.is_empty() {
            return Err("values must not be empty".to_string());
        }
    }

    Ok(())
}

/// Resolved inline foreign key: referenced table, referenced column,
/// on_delete, on_update.
type ResolvedKey = (String, String, ForeignKeyAction, ForeignKeyAction);

/// Step 4: every foreign key points at an existing primary key and uses a
/// recognised action. Keyed by `(table index, column index)`.
fn check_foreign_keys(raw: &RawSchema) -> ValidationResult<HashMap<(usize, usize), ResolvedKey>> {
    let mut resolved = HashMap::new();

    for (ti, table) in raw.tables.iter().enumerate() {
        for (ci, column) in table.columns.iter().enumerate() {
            let Some(fk) = &column.foreign_key else {
                continue;
            };
            let location = ErrorLocation::column(ti, &table.name, ci, &column.name);
            let fail = |kind| Err(ValidationError::new(location.clone(), kind));

            let Some(referenced) = raw.tables.iter().find(|t| t.name == fk.table) else {
                return fail(ValidationErrorKind::UnknownReferencedTable {
                    referenced_table: fk.table.clone(),
                });
            };
            let Some(referenced_column) = referenced.columns.iter().find(|c| c.name == fk.column)
            else {
                return fail(ValidationErrorKind::UnknownReferencedColumn {
                    referenced_table: fk.table.clone(),
                    referenced_column: fk.column.clone(),
                });
            };
            if !referenced_column.primary_key {
                return fail(ValidationErrorKind::ReferencedColumnNotPrimaryKey {
                    referenced_table: fk.table.clone(),
                    referenced_column: fk.column.clone(),
                });
            }

            let on_delete = parse_action("on_delete", fk.on_delete.as_deref());
            let on_update = parse_action("on_update", fk.on_update.as_deref());
            let (on_delete, on_update) = match (on_delete, on_update) {
                (Ok(d), Ok(u)) => (d, u),
                (Err(kind), _) | (_, Err(kind)) => return fail(kind),
            };

            resolved.insert(
                (ti, ci),
                (fk.table.clone(), fk.column.clone(), on_delete, on_update),
            );
        }
    }

    Ok(resolved)
}

fn parse_action(
    field: &'static str,
    value: Option<&str>,
) -> std::result::Result<ForeignKeyAction, ValidationErrorKind> {
    match value {
        None => Ok(ForeignKeyAction::default()),
        Some(v) => ForeignKeyAction::parse_action(v).ok_or_else(|| {
            ValidationErrorKind::InvalidForeignKeyAction {
                field,
                value: v.to_string(),
            }
        }),
    }
}

/// Step 5: every table appears exactly once and follows the tables it
/// references. Returns each table's position.
fn check_generation_order(raw: &RawSchema) -> ValidationResult<HashMap<&str, usize>> {
    let defined: HashSet<&str> = raw.tables.iter().map(|t| t.name.as_str()).collect();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for (pos, name) in raw.generation_order.iter().enumerate() {
        if !defined.contains(name.as_str()) {
            return Err(schema_error(
                ValidationErrorKind::UnknownTableInGenerationOrder {
                    table: name.clone(),
                },
            ));
        }
        if positions.insert(name.as_str(), pos).is_some() {
            return Err(schema_error(ValidationErrorKind::DuplicateInGenerationOrder {
                table: name.clone(),
            }));
        }
    }

    for (ti, table) in raw.tables.iter().enumerate() {
        if !positions.contains_key(table.name.as_str()) {
            return Err(ValidationError::new(
                ErrorLocation::table(ti, &table.name),
                ValidationErrorKind::MissingFromGenerationOrder,
            ));
        }
    }

    for (ti, table) in raw.tables.iter().enumerate() {
        let table_position = positions[table.name.as_str()];
        for (ci, column) in table.columns.iter().enumerate() {
            let Some(fk) = &column.foreign_key else {
                continue;
            };
            let referenced_position = positions[fk.table.as_str()];
            if referenced_position < table_position {
                continue;
            }

            return Err(ValidationError::new(
                ErrorLocation::column(ti, &table.name, ci, &column.name),
                ValidationErrorKind::GenerationOrderConflict {
                    table: table.name.clone(),
                    table_position,
                    column: column.name.clone(),
                    referenced_table: fk.table.clone(),
                    referenced_position,
                    hint: ordering_hint(raw, &table.name, &fk.table),
                },
            ));
        }
    }

    Ok(positions)
}

fn ordering_hint(raw: &RawSchema, table: &str, referenced_table: &str) -> String {
    if table == referenced_table {
        return "; self-referencing foreign keys cannot be satisfied by a generation order"
            .to_string();
    }
    match DependencyGraph::from_document(raw).suggested_order() {
        Some(order) => format!("; suggested generation_order: [{}]", order.join(", ")),
        None => "; the foreign keys form a cycle, so no generation order can satisfy them"
            .to_string(),
    }
}

/// Columns covered by a single-column unique index.
fn unique_index_columns<'a>(
    raw: &'a RawSchema,
    table_index: usize,
    warnings: &mut Vec<String>,
) -> HashSet<&'a str> {
    let table = &raw.tables[table_index];
    let mut unique = HashSet::new();

    for index in &table.indexes {
        for column in &index.columns {
            if !table.columns.iter().any(|c| &c.name == column) {
                warnings.push(format!(
                    "index '{}' on '{}' names unknown column '{}'",
                    index.name, table.name, column
                ));
            }
        }
        if index.unique && index.columns.len() == 1 {
            unique.insert(index.columns[0].as_str());
        }
    }

    unique
}

/// `relationships[]` is documentation only. Entries that no inline foreign
/// key backs up are reported, never enforced.
fn check_relationships(raw: &RawSchema, warnings: &mut Vec<String>) {
    for rel in &raw.relationships {
        let inline = raw
            .tables
            .iter()
            .find(|t| t.name == rel.from_table)
            .and_then(|t| t.columns.iter().find(|c| c.name == rel.from_column))
            .and_then(|c| c.foreign_key.as_ref());

        match inline {
            Some(fk) if fk.table == rel.to_table && fk.column == rel.to_column => {}
            Some(fk) => warnings.push(format!(
                "relationship {}.{} -> {}.{} disagrees with the inline foreign key ({}.{}); using the inline foreign key",
                rel.from_table, rel.from_column, rel.to_table, rel.to_column, fk.table, fk.column
            )),
            None => warnings.push(format!(
                "relationship {}.{} -> {}.{} has no matching inline foreign key; ignoring it",
                rel.from_table, rel.from_column, rel.to_table, rel.to_column
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lending() -> serde_json::Value {
        json!({
            "schema_version": "1.0",
            "name": "lending",
            "database_type": ["postgresql"],
            "tables": [
                {
                    "name": "borrowers",
                    "record_count": 250,
                    "columns": [
                        {"name": "id", "type": "INTEGER", "primary_key": true, "auto_increment": true},
                        {"name": "email", "type": "VARCHAR(255)", "generator": "email"}
                    ],
                    "indexes": [{"name": "borrowers_email_key", "columns": ["email"], "unique": true}]
                },
                {
                    "name": "loans",
                    "record_count": 1000,
                    "columns": [
                        {"name": "id", "type": "INTEGER", "primary_key": true, "auto_increment": true},
                        {"name": "borrower_id", "type": "INTEGER",
                         "foreign_key": {"table": "borrowers", "column": "id", "on_delete": "CASCADE"}}
                    ]
                }
            ],
            "generation_order": ["borrowers", "loans"]
        })
    }

    fn run(doc: serde_json::Value) -> ValidationResult<ValidatedSchema> {
        validate(&serde_json::from_value(doc).unwrap())
    }

    fn kind(doc: serde_json::Value) -> ValidationErrorKind {
        run(doc).unwrap_err().kind
    }

    #[test]
    fn test_valid_schema_is_indexed() {
        let schema = run(lending()).unwrap();
        assert_eq!(schema.table_count(), 2);
        assert_eq!(schema.database_types, vec![DatabaseType::PostgreSQL]);

        let loans = schema.table("loans").unwrap();
        assert_eq!(loans.position, 1);
        assert_eq!(loans.record_count, 1000);
        let fk = loans.columns[1].foreign_key.as_ref().unwrap();
        assert_eq!(fk.referenced_table, "borrowers");
        assert_eq!(fk.referenced_position, 0);
        assert_eq!(fk.on_delete, ForeignKeyAction::Cascade);
        assert_eq!(fk.on_update, ForeignKeyAction::Restrict);

        let borrowers = schema.table("borrowers").unwrap();
        assert_eq!(borrowers.primary_key_column().name, "id");
        assert!(borrowers.column("email").unwrap().unique);
        assert!(schema.warnings.is_empty());
    }

    #[test]
    fn test_tables_follow_generation_order() {
        let mut doc = lending();
        let tables = doc["tables"].as_array_mut().unwrap();
        tables.reverse();
        let schema = run(doc).unwrap();
        let names: Vec<&String> = schema.tables.keys().collect();
        assert_eq!(names, vec!["borrowers", "loans"]);
    }

    #[test]
    fn test_top_level_checks() {
        let mut doc = lending();
        doc["name"] = json!("");
        assert_eq!(kind(doc), ValidationErrorKind::MissingSchemaName);

        let mut doc = lending();
        doc["tables"] = json!([]);
        assert_eq!(kind(doc), ValidationErrorKind::NoTables);

        let mut doc = lending();
        doc["database_type"] = json!([]);
        assert_eq!(kind(doc), ValidationErrorKind::NoDatabaseType);

        let mut doc = lending();
        doc["database_type"] = json!(["oracle"]);
        assert!(matches!(
            kind(doc),
            ValidationErrorKind::UnsupportedDatabaseTypes { .. }
        ));

        let mut doc = lending();
        doc["database_type"] = json!(["oracle", "mysql"]);
        let schema = run(doc).unwrap();
        assert_eq!(schema.database_types, vec![DatabaseType::MySQL]);
        assert_eq!(schema.warnings.len(), 1);
    }

    #[test]
    fn test_table_checks_name_location() {
        let mut doc = lending();
        doc["tables"][1]["record_count"] = json!(0);
        let err = run(doc).unwrap_err();
        assert_eq!(err.location.table_index, Some(1));
        assert_eq!(err.table_name(), Some("loans"));
        assert_eq!(err.kind, ValidationErrorKind::NonPositiveRecordCount { value: 0 });

        let mut doc = lending();
        doc["tables"][1]["name"] = json!("borrowers");
        assert_eq!(
            kind(doc),
            ValidationErrorKind::DuplicateTable {
                name: "borrowers".to_string()
            }
        );

        let mut doc = lending();
        doc["tables"][0]["columns"][0]["primary_key"] = json!(false);
        assert_eq!(kind(doc), ValidationErrorKind::NoPrimaryKey);

        let mut doc = lending();
        doc["tables"][0]["columns"][1]["primary_key"] = json!(true);
        assert!(matches!(
            kind(doc),
            ValidationErrorKind::MultiplePrimaryKeys { count: 2, .. }
        ));
    }

    #[test]
    fn test_table_checks_run_before_column_checks() {
        let mut doc = lending();
        doc["tables"][0]["columns"][1]["type"] = json!("GEOMETRY");
        doc["tables"][1]["record_count"] = json!(-5);
        assert!(matches!(
            kind(doc),
            ValidationErrorKind::NonPositiveRecordCount { value: -5 }
        ));
    }

    #[test]
    fn test_column_checks() {
        let mut doc = lending();
        doc["tables"][0]["columns"][1]["type"] = json!("GEOMETRY");
        let err = run(doc).unwrap_err();
        assert_eq!(err.column_name(), Some("email"));
        assert_eq!(err.location.column_index, Some(1));
        assert_eq!(
            err.kind,
            ValidationErrorKind::UnknownDataType {
                declared: "GEOMETRY".to_string()
            }
        );

        let mut doc = lending();
        doc["tables"][0]["columns"][1]["name"] = json!("id");
        assert!(matches!(
            kind(doc),
            ValidationErrorKind::DuplicateColumn { .. }
        ));

        let mut doc = lending();
        doc["tables"][0]["columns"][1]["type"] = json!("ENUM");
        assert!(matches!(kind(doc), ValidationErrorKind::EmptyEnum { .. }));
    }

    #[test]
    fn test_generator_params_checks() {
        let cases = [
            json!({"values": ["A", "B"], "weights": [1.0]}),
            json!({"min": 10, "max": 1}),
            json!({"null_probability": 1.5}),
            json!({"weights": [0.0, 0.0], "values": [1, 2]}),
            json!({"ranges": [[5, 1]], "weights": [1]}),
            json!({"weights": [1.0]}),
            json!({"days_back": 1_000_000_000}),
            json!({"days_forward": -1}),
        ];
        for params in cases {
            let mut doc = lending();
            doc["tables"][0]["columns"][1]["generator_params"] = params.clone();
            assert!(
                matches!(
                    kind(doc),
                    ValidationErrorKind::InvalidGeneratorParams { .. }
                ),
                "{}",
                params
            );
        }
    }

    #[test]
    fn test_day_window_limit_is_inclusive() {
        let mut doc = lending();
        doc["tables"][0]["columns"][1]["generator_params"] =
            json!({"days_back": MAX_DAY_WINDOW, "days_forward": MAX_DAY_WINDOW});
        assert!(run(doc).is_ok());

        let mut doc = lending();
        doc["tables"][0]["columns"][1]["generator_params"] = json!({"days_back": MAX_DAY_WINDOW + 1});
        match kind(doc) {
            ValidationErrorKind::InvalidGeneratorParams { reason } => {
                assert!(reason.contains("days_back"), "{}", reason)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_foreign_key_checks() {
        let mut doc = lending();
        doc["tables"][1]["columns"][1]["foreign_key"]["table"] = json!("lenders");
        assert_eq!(
            kind(doc),
            ValidationErrorKind::UnknownReferencedTable {
                referenced_table: "lenders".to_string()
            }
        );

        let mut doc = lending();
        doc["tables"][1]["columns"][1]["foreign_key"]["column"] = json!("uuid");
        assert!(matches!(
            kind(doc),
            ValidationErrorKind::UnknownReferencedColumn { .. }
        ));

        let mut doc = lending();
        doc["tables"][1]["columns"][1]["foreign_key"]["column"] = json!("email");
        assert!(matches!(
            kind(doc),
            ValidationErrorKind::ReferencedColumnNotPrimaryKey { .. }
        ));
    }

    #[test]
    fn test_invalid_action_names_table_column_and_value() {
        let mut doc = lending();
        doc["tables"][1]["columns"][1]["foreign_key"]["on_update"] = json!("EXPLODE");
        let err = run(doc).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("loans"), "{}", msg);
        assert!(msg.contains("borrower_id"), "{}", msg);
        assert!(msg.contains("EXPLODE"), "{}", msg);
        assert_eq!(
            err.kind,
            ValidationErrorKind::InvalidForeignKeyAction {
                field: "on_update",
                value: "EXPLODE".to_string()
            }
        );
    }

    #[test]
    fn test_generation_order_membership() {
        let mut doc = lending();
        doc["generation_order"] = json!(["borrowers", "loans", "payments"]);
        assert!(matches!(
            kind(doc),
            ValidationErrorKind::UnknownTableInGenerationOrder { .. }
        ));

        let mut doc = lending();
        doc["generation_order"] = json!(["borrowers", "borrowers", "loans"]);
        assert!(matches!(
            kind(doc),
            ValidationErrorKind::DuplicateInGenerationOrder { .. }
        ));

        let mut doc = lending();
        doc["generation_order"] = json!(["borrowers"]);
        let err = run(doc).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MissingFromGenerationOrder);
        assert_eq!(err.table_name(), Some("loans"));
    }

    #[test]
    fn test_ordering_conflict_names_both_tables() {
        let mut doc = lending();
        doc["generation_order"] = json!(["loans", "borrowers"]);
        let err = run(doc).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'loans'"), "{}", msg);
        assert!(msg.contains("'borrowers'"), "{}", msg);
        assert!(
            msg.contains("suggested generation_order: [borrowers, loans]"),
            "{}",
            msg
        );
        assert!(matches!(
            err.kind,
            ValidationErrorKind::GenerationOrderConflict {
                table_position: 0,
                referenced_position: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_self_reference_is_an_ordering_conflict() {
        let mut doc = lending();
        doc["tables"][0]["columns"]
            .as_array_mut()
            .unwrap()
            .push(json!({"name": "referrer_id", "type": "INTEGER", "nullable": true,
                         "foreign_key": {"table": "borrowers", "column": "id"}}));
        let err = run(doc).unwrap_err();
        assert!(err.to_string().contains("self-referencing"), "{}", err);
    }

    #[test]
    fn test_relationship_disagreement_is_a_warning() {
        let mut doc = lending();
        doc["relationships"] = json!([
            {"from_table": "loans", "from_column": "borrower_id", "to_table": "borrowers", "to_column": "id"},
            {"from_table": "loans", "from_column": "cosigner_id", "to_table": "borrowers", "to_column": "id"}
        ]);
        let schema = run(doc).unwrap();
        assert_eq!(schema.warnings.len(), 1);
        assert!(schema.warnings[0].contains("cosigner_id"));
    }
}
