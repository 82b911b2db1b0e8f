//! # Key Tracker
//!
//! Per-table pools of generated primary key values. Parent tables are
//! generated first (`generation_order`), and every primary key they produce is
//! recorded here in row order. Once a table finishes its pool is frozen, and
//! child tables sample foreign key values from it.
//!
//! The tracker is owned by a single generation run and never shared across
//! runs.

use std::collections::HashMap;

use rand::Rng;
use thiserror::Error;

use crate::generate::value::Value;

/// Why a key pool operation was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyPoolError {
    #[error("no keys have been recorded for '{table}'")]
    Empty { table: String },

    #[error("key pool for '{table}' is frozen")]
    Frozen { table: String },

    #[error("key pool for '{table}' is still being filled")]
    NotFrozen { table: String },

    #[error("cannot reserve room for {rows} keys in '{table}'")]
    Capacity { table: String, rows: usize },
}

#[derive(Debug, Default)]
struct KeyPool {
    keys: Vec<Value>,
    frozen: bool,
}

/// Manages the primary key pools for one generation run.
#[derive(Debug, Default)]
pub struct KeyTracker {
    pools: HashMap<String, KeyPool>,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty pool for a table whose generation is starting.
    pub fn begin(&mut self, table: &str, capacity: usize) -> Result<(), KeyPoolError> {
        if self.is_frozen(table) {
            return Err(KeyPoolError::Frozen {
                table: table.to_string(),
            });
        }
        let mut keys = Vec::new();
        keys.try_reserve_exact(capacity)
            .map_err(|_| KeyPoolError::Capacity {
                table: table.to_string(),
                rows: capacity,
            })?;
        self.pools.insert(
            table.to_string(),
            KeyPool {
                keys,
                frozen: false,
            },
        );
        Ok(())
    }

    /// Append a generated primary key to a table's pool.
    pub fn record(&mut self, table: &str, key: Value) -> Result<(), KeyPoolError> {
        let pool = self.pools.entry(table.to_string()).or_default();
        if pool.frozen {
            return Err(KeyPoolError::Frozen {
                table: table.to_string(),
            });
        }
        pool.keys.push(key);
        Ok(())
    }

    /// Mark a table's pool read-only. Called once its generation completes.
    pub fn freeze(&mut self, table: &str) {
        self.pools.entry(table.to_string()).or_default().frozen = true;
    }

    pub fn is_frozen(&self, table: &str) -> bool {
        self.pools.get(table).is_some_and(|p| p.frozen)
    }

    /// Pick one key uniformly at random from a table's completed pool.
    pub fn sample(&self, table: &str, rng: &mut impl Rng) -> Result<Value, KeyPoolError> {
        if self.pools.contains_key(table) && !self.is_frozen(table) {
            return Err(KeyPoolError::NotFrozen {
                table: table.to_string(),
            });
        }
        let keys = self.keys(table);
        if keys.is_empty() {
            return Err(KeyPoolError::Empty {
                table: table.to_string(),
            });
        }
        Ok(keys[rng.random_range(0..keys.len())].clone())
    }

    pub fn pool_size(&self, table: &str) -> usize {
        self.keys(table).len()
    }

    /// All keys recorded for a table, in row order.
    pub fn keys(&self, table: &str) -> &[Value] {
        self.pools
            .get(table)
            .map(|p| p.keys.as_slice())
            .unwrap_or_default()
    }
}
