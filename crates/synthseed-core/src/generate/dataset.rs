use indexmap::IndexMap;
use serde::Serialize;

use crate::generate::value::Value;

/// One generated row. `IndexMap` keeps column order stable so exports are
/// byte-identical across runs.
pub type Row = IndexMap<String, Value>;

/// The output of one generation run, in `generation_order`.
///
/// Built once by [`crate::generate::engine::generate`] and immutable after
/// it returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub tables: IndexMap<String, TableData>,
}

/// Rows for one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableData {
    /// Column names in declaration order.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn table(&self, name: &str) -> Option<&TableData> {
        self.tables.get(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|s| s.as_str())
    }

    pub fn total_rows(&self) -> usize {
        self.tables.values().map(|t| t.rows.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_rows() == 0
    }
}

impl TableData {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every value of one column, in row order.
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows.iter().filter_map(move |row| row.get(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_values_and_counts() {
        let mut table = TableData::new(vec!["id".to_string(), "name".to_string()]);
        for i in 1..=3 {
            let mut row = Row::new();
            row.insert("id".to_string(), Value::Int(i));
            row.insert("name".to_string(), Value::Null);
            table.rows.push(row);
        }
        let mut dataset = Dataset::default();
        dataset.tables.insert("users".to_string(), table);

        let ids: Vec<_> = dataset
            .table("users")
            .unwrap()
            .column_values("id")
            .filter_map(|v| v.as_int())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(dataset.total_rows(), 3);
        assert_eq!(dataset.table_names().collect::<Vec<_>>(), vec!["users"]);
        assert!(dataset.table("orders").is_none());
    }
}
