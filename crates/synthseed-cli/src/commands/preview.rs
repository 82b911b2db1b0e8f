use anyhow::Result;
use comfy_table::Table as ComfyTable;
use tokio_util::sync::CancellationToken;

use synthseed_core::generate::{self, GenerateOptions, GeneratorRegistry};

use crate::args::PreviewArgs;

/// Longest cell rendered before truncation.
const MAX_CELL_CHARS: usize = 40;

pub async fn run(args: &PreviewArgs) -> Result<()> {
    let (_, schema) = super::load_validated(&args.schema)?;

    // Every table gets the preview row count; parents only need enough keys
    // for the children shown.
    let mut options = GenerateOptions::with_seed(args.seed);
    options.overrides = schema
        .tables
        .keys()
        .map(|name| (name.clone(), args.rows.max(1)))
        .collect();

    let registry = GeneratorRegistry::with_builtins();
    let data = generate::generate(
        &schema,
        &registry,
        &options,
        &CancellationToken::new(),
        None,
    )?;

    for (table_name, table) in &data.tables {
        if table.is_empty() {
            continue;
        }

        println!("━━━ {} ({} rows) ━━━", table_name, table.len());

        let mut t = ComfyTable::new();
        t.set_header(table.columns.iter().map(String::as_str).collect::<Vec<_>>());

        for row in &table.rows {
            let values: Vec<String> = table
                .columns
                .iter()
                .map(|col| {
                    row.get(col)
                        .map(|v| truncate(&v.to_string()))
                        .unwrap_or_else(|| "NULL".to_string())
                })
                .collect();
            t.add_row(values);
        }

        println!("{}\n", t);
    }

    Ok(())
}

fn truncate(s: &str) -> String {
    if s.chars().count() > MAX_CELL_CHARS {
        let head: String = s.chars().take(MAX_CELL_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("short"), "short");
        let long = "é".repeat(50);
        let cut = truncate(&long);
        assert_eq!(cut.chars().count(), MAX_CELL_CHARS);
        assert!(cut.ends_with("..."));
    }
}
