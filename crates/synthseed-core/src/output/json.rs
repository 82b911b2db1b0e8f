use std::io::Write;

use crate::error::{Result, SynthSeedError};
use crate::generate::dataset::Dataset;
use crate::generate::value::Value;

/// Write a dataset as a JSON object keyed by table name, each holding an
/// array of row objects.
///
/// Streams table-by-table and row-by-row instead of building the whole
/// JSON tree in memory first.
pub fn write_json<W: Write>(writer: &mut W, data: &Dataset) -> Result<()> {
    let table_count = data.tables.len();

    write_str(writer, "{\n")?;

    for (table_idx, (table_name, table)) in data.tables.iter().enumerate() {
        write_str(writer, &format!("  {}: [", json_key(table_name)?))?;
        if !table.rows.is_empty() {
            write_str(writer, "\n")?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            write_str(writer, "    {")?;

            let col_count = row.len();
            for (col_idx, (col_name, value)) in row.iter().enumerate() {
                write_str(
                    writer,
                    &format!("\n      {}: {}", json_key(col_name)?, json_value(value)?),
                )?;
                if col_idx + 1 < col_count {
                    write_str(writer, ",")?;
                }
            }

            write_str(writer, "\n    }")?;
            if row_idx + 1 < table.rows.len() {
                write_str(writer, ",")?;
            }
            write_str(writer, "\n")?;
        }

        write_str(writer, if table.rows.is_empty() { "]" } else { "  ]" })?;
        if table_idx + 1 < table_count {
            write_str(writer, ",")?;
        }
        write_str(writer, "\n")?;
    }

    write_str(writer, "}\n")
}

fn write_str<W: Write>(writer: &mut W, s: &str) -> Result<()> {
    writer
        .write_all(s.as_bytes())
        .map_err(|e| SynthSeedError::Output {
            message: "writing JSON".to_string(),
            source: e,
        })
}

/// RFC 8259-compliant key escaping via serde_json.
fn json_key(s: &str) -> Result<String> {
    serde_json::to_string(s).map_err(|e| SynthSeedError::Output {
        message: "serializing JSON key".to_string(),
        source: e.into(),
    })
}

fn json_value(value: &Value) -> Result<String> {
    serde_json::to_string(&value_to_json(value)).map_err(|e| SynthSeedError::Output {
        message: "serializing JSON value".to_string(),
        source: e.into(),
    })
}

/// Timestamps are written as ISO 8601 (`2025-06-15T12:30:45`); everything
/// else uses the value's plain JSON form.
fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Timestamp(ts) => {
            serde_json::Value::String(ts.format("%Y-%m-%dT%H:%M:%S").to_string())
        }
        other => other.to_json(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::dataset::{Row, TableData};
    use std::borrow::Cow;

    fn dataset(table: &str, rows: Vec<Row>) -> Dataset {
        let columns = rows
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default();
        let mut data = Dataset::default();
        data.tables
            .insert(table.to_string(), TableData { columns, rows });
        data
    }

    fn render(data: &Dataset) -> String {
        let mut output = Vec::new();
        write_json(&mut output, data).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_write_json() {
        let mut row = Row::new();
        row.insert("name".to_string(), Value::String(Cow::Borrowed("Alice")));
        row.insert("active".to_string(), Value::Bool(true));
        row.insert("nickname".to_string(), Value::Null);

        let parsed: serde_json::Value =
            serde_json::from_str(&render(&dataset("users", vec![row]))).unwrap();
        assert_eq!(parsed["users"][0]["name"], "Alice");
        assert_eq!(parsed["users"][0]["active"], true);
        assert!(parsed["users"][0]["nickname"].is_null());
    }

    #[test]
    fn test_timestamp_iso8601() {
        let mut row = Row::new();
        let ts = chrono::NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(12, 30, 45)
            .unwrap();
        row.insert("created_at".to_string(), Value::Timestamp(ts));

        let parsed: serde_json::Value =
            serde_json::from_str(&render(&dataset("events", vec![row]))).unwrap();
        assert_eq!(parsed["events"][0]["created_at"], "2025-06-15T12:30:45");
    }

    #[test]
    fn test_empty_table_is_valid_json() {
        let parsed: serde_json::Value =
            serde_json::from_str(&render(&dataset("empty", Vec::new()))).unwrap();
        assert_eq!(parsed["empty"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_streaming_produces_valid_json() {
        let rows = (0..500)
            .map(|i| {
                let mut row = Row::new();
                row.insert("id".to_string(), Value::Int(i));
                row.insert(
                    "name".to_string(),
                    Value::String(Cow::Owned(format!("user \"{}\"", i))),
                );
                row
            })
            .collect();
        let parsed: serde_json::Value =
            serde_json::from_str(&render(&dataset("users", rows))).unwrap();
        assert_eq!(parsed["users"].as_array().unwrap().len(), 500);
        assert_eq!(parsed["users"][3]["name"], "user \"3\"");
    }

    #[test]
    fn test_deterministic_column_order() {
        let mut row = Row::new();
        for (i, name) in ["alpha", "beta", "gamma", "delta"].iter().enumerate() {
            row.insert(name.to_string(), Value::Int(i as i64));
        }
        let data = dataset("test", vec![row]);
        let first = render(&data);
        assert_eq!(first, render(&data));

        let alpha = first.find("\"alpha\"").unwrap();
        let beta = first.find("\"beta\"").unwrap();
        let delta = first.find("\"delta\"").unwrap();
        assert!(alpha < beta && beta < delta);
    }
}
