use std::io::Write;

use crate::error::{Result, SynthSeedError};
use crate::generate::dataset::{Dataset, TableData};

/// Write a dataset as CSV, one section per table. Each section starts with
/// a `# Table: <name>` comment line, then the header row, then data rows.
pub fn write_csv<W: Write>(writer: &mut W, data: &Dataset) -> Result<()> {
    for (table_name, table) in &data.tables {
        writeln!(writer, "# Table: {}", table_name).map_err(|e| SynthSeedError::Output {
            message: format!("writing CSV header for {}", table_name),
            source: e,
        })?;

        write_csv_table(writer, table_name, table)?;

        writeln!(writer).map_err(|e| SynthSeedError::Output {
            message: "writing newline".to_string(),
            source: e,
        })?;
    }

    Ok(())
}

/// Write CSV for a single table: header row from the declared columns, then
/// one line per row. NULL is written as an empty field.
pub fn write_csv_table<W: Write>(writer: &mut W, table_name: &str, table: &TableData) -> Result<()> {
    let header = table
        .columns
        .iter()
        .map(|c| csv_escape(c))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(writer, "{}", header).map_err(|e| SynthSeedError::Output {
        message: format!("writing CSV columns for {}", table_name),
        source: e,
    })?;

    for row in &table.rows {
        let values: Vec<String> = table
            .columns
            .iter()
            .map(|col| {
                row.get(col)
                    .map(|v| csv_escape(&v.to_csv_string()))
                    .unwrap_or_default()
            })
            .collect();

        writeln!(writer, "{}", values.join(",")).map_err(|e| SynthSeedError::Output {
            message: format!("writing CSV row for {}", table_name),
            source: e,
        })?;
    }

    Ok(())
}

/// Escape a string for CSV: quote if it contains comma, quote, or newline.
fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::dataset::Row;
    use crate::generate::value::Value;
    use std::borrow::Cow;

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("hello"), "hello");
        assert_eq!(csv_escape("hello,world"), "\"hello,world\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_write_csv_sections() {
        let mut table = TableData::new(vec!["id".to_string(), "name".to_string()]);
        let mut row = Row::new();
        row.insert("id".to_string(), Value::Int(1));
        row.insert("name".to_string(), Value::String(Cow::Borrowed("O'Brien, Pat")));
        table.rows.push(row);
        let mut row = Row::new();
        row.insert("id".to_string(), Value::Int(2));
        row.insert("name".to_string(), Value::Null);
        table.rows.push(row);

        let mut data = Dataset::default();
        data.tables.insert("people".to_string(), table);
        data.tables
            .insert("empty".to_string(), TableData::new(vec!["id".to_string()]));

        let mut out = Vec::new();
        write_csv(&mut out, &data).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "# Table: people\nid,name\n1,\"O'Brien, Pat\"\n2,\n\n# Table: empty\nid\n\n"
        );
    }
}
