use anyhow::Result;
use comfy_table::Table as ComfyTable;
use serde::Serialize;

use synthseed_core::schema::{self, ValidatedSchema};
use synthseed_core::SynthSeedError;

use crate::args::ValidateArgs;

/// JSON report printed by `synthseed validate --json`.
#[derive(Debug, Serialize)]
struct ValidationReport {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<String>,
    warnings: Vec<String>,
    tables: Vec<TableSummary>,
}

#[derive(Debug, Serialize)]
struct TableSummary {
    name: String,
    record_count: usize,
    columns: usize,
    foreign_keys: usize,
}

pub async fn run(args: &ValidateArgs) -> Result<()> {
    let raw = schema::load_schema(&args.schema)?;

    match schema::validate(&raw) {
        Ok(validated) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&success_report(&validated))?
                );
            } else {
                print_summary(&validated);
            }
            Ok(())
        }
        Err(err) => {
            if args.json {
                let report = ValidationReport {
                    valid: false,
                    schema: Some(raw.name.clone()).filter(|n| !n.is_empty()),
                    error: Some(err.kind.to_string()),
                    table: err.table_name().map(str::to_string),
                    column: err.column_name().map(str::to_string),
                    warnings: Vec::new(),
                    tables: Vec::new(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Err(SynthSeedError::from(err).into())
        }
    }
}

fn success_report(schema: &ValidatedSchema) -> ValidationReport {
    ValidationReport {
        valid: true,
        schema: Some(schema.name.clone()),
        error: None,
        table: None,
        column: None,
        warnings: schema.warnings.clone(),
        tables: schema
            .tables
            .values()
            .map(|t| TableSummary {
                name: t.name.clone(),
                record_count: t.record_count,
                columns: t.columns.len(),
                foreign_keys: t.columns.iter().filter(|c| c.foreign_key.is_some()).count(),
            })
            .collect(),
    }
}

fn print_summary(schema: &ValidatedSchema) {
    for warning in &schema.warnings {
        eprintln!("warning: {}", warning);
    }

    let mut t = ComfyTable::new();
    t.set_header(vec!["#", "Table", "Rows", "Columns", "Depends on"]);
    for table in schema.tables.values() {
        let parents: Vec<&str> = table
            .columns
            .iter()
            .filter_map(|c| c.foreign_key.as_ref())
            .map(|fk| fk.referenced_table.as_str())
            .collect();
        t.add_row(vec![
            (table.position + 1).to_string(),
            table.name.clone(),
            table.record_count.to_string(),
            table.columns.len().to_string(),
            if parents.is_empty() {
                "-".to_string()
            } else {
                parents.join(", ")
            },
        ]);
    }
    println!("{}", t);

    let databases: Vec<String> = schema.database_types.iter().map(|d| d.to_string()).collect();
    eprintln!(
        "\n✓ Schema '{}' is valid: {} tables, {} columns, {} foreign keys, {} rows ({})",
        schema.name,
        schema.table_count(),
        schema.column_count(),
        schema.foreign_key_count(),
        schema.total_record_count(),
        databases.join(", ")
    );
}
