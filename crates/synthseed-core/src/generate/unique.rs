use std::collections::{HashMap, HashSet};

use crate::generate::value::Value;

/// Tracks generated values for unique constraint enforcement.
///
/// One seen-set per `(table, column)`. Owned by the single writer that
/// commits rows, so no synchronization is needed.
pub struct UniqueTracker {
    constraints: HashMap<String, HashSet<String>>,
    /// Maximum resamples per value before giving up.
    pub max_retries: usize,
}

impl UniqueTracker {
    pub fn new(max_retries: usize) -> Self {
        Self {
            constraints: HashMap::new(),
            max_retries,
        }
    }

    /// Register a unique column to track.
    pub fn register(&mut self, table_name: &str, column_name: &str) {
        self.constraints
            .entry(constraint_key(table_name, column_name))
            .or_default();
    }

    /// Check whether a value would be new without recording it.
    pub fn is_new(&self, table_name: &str, column_name: &str, value: &Value) -> bool {
        self.constraints
            .get(&constraint_key(table_name, column_name))
            .is_none_or(|seen| !seen.contains(&value.to_unique_key()))
    }

    /// Record a value. Returns `false` if it was already seen.
    ///
    /// Nulls never collide, matching SQL unique semantics.
    pub fn try_insert(&mut self, table_name: &str, column_name: &str, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        match self.constraints.get_mut(&constraint_key(table_name, column_name)) {
            Some(seen) => seen.insert(value.to_unique_key()),
            // Constraint not registered, allow anything
            None => true,
        }
    }

    /// Get the number of unique values tracked for a column.
    pub fn count(&self, table_name: &str, column_name: &str) -> usize {
        self.constraints
            .get(&constraint_key(table_name, column_name))
            .map(|s| s.len())
            .unwrap_or(0)
    }
}

impl Default for UniqueTracker {
    fn default() -> Self {
        Self::new(1000)
    }
}

fn constraint_key(table_name: &str, column_name: &str) -> String {
    format!("{}:{}", table_name, column_name)
}
