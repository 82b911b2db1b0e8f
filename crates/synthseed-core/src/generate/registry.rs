//! # Generator Registry
//!
//! Maps generator names (as written in a column's `generator` field) to a
//! sampler and an edge-case function. The orchestrator never branches on
//! generator names; adding a verticalized generator is one `register` call.
//!
//! ```ignore
//! let mut registry = GeneratorRegistry::with_builtins();
//! registry.register("npi", |args, rng| {
//!     Ok(Value::Int(rng.random_range(1_000_000_000..2_000_000_000)))
//! });
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use thiserror::Error;

use crate::generate::providers;
use crate::generate::value::Value;
use crate::schema::document::GeneratorParams;

/// A sampler rejected its parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct SampleError(pub String);

impl SampleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// A required parameter is absent.
    pub fn missing(generator: &str, param: &str) -> Self {
        Self(format!("'{}' requires generator_params.{}", generator, param))
    }
}

/// Everything a sampler may read besides the random source.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorArgs<'a> {
    pub params: &'a GeneratorParams,
    /// Zero-based row index within the table.
    pub row_index: usize,
    /// Pinned anchor for temporal values, so reruns do not drift with the
    /// wall clock.
    pub base_time: NaiveDateTime,
}

pub type SampleFn =
    dyn Fn(&GeneratorArgs<'_>, &mut StdRng) -> Result<Value, SampleError> + Send + Sync;

pub type EdgeCaseFn = dyn Fn(&GeneratorArgs<'_>) -> Vec<Value> + Send + Sync;

/// A registered generator: how to sample it, and which boundary values to
/// substitute during edge-case injection.
#[derive(Clone)]
pub struct GeneratorEntry {
    sample: Arc<SampleFn>,
    edge_cases: Arc<EdgeCaseFn>,
}

impl GeneratorEntry {
    pub fn sample(&self, args: &GeneratorArgs<'_>, rng: &mut StdRng) -> Result<Value, SampleError> {
        (self.sample)(args, rng)
    }

    /// Boundary values for the given parameters. May be empty, in which case
    /// the column's type boundaries are used instead.
    pub fn edge_cases(&self, args: &GeneratorArgs<'_>) -> Vec<Value> {
        (self.edge_cases)(args)
    }
}

impl std::fmt::Debug for GeneratorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorEntry").finish_non_exhaustive()
    }
}

/// Name → generator mapping, populated once before a run.
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    entries: HashMap<String, GeneratorEntry>,
}

impl GeneratorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in generator.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        providers::register_builtins(&mut registry);
        registry
    }

    /// Register a generator with no edge cases of its own.
    pub fn register<F>(&mut self, name: &str, sample: F)
    where
        F: Fn(&GeneratorArgs<'_>, &mut StdRng) -> Result<Value, SampleError>
            + Send
            + Sync
            + 'static,
    {
        self.register_with_edge_cases(name, sample, |_: &GeneratorArgs<'_>| Vec::new());
    }

    /// Register a generator and its boundary values. Replaces any existing
    /// generator of the same name.
    pub fn register_with_edge_cases<F, E>(&mut self, name: &str, sample: F, edge_cases: E)
    where
        F: Fn(&GeneratorArgs<'_>, &mut StdRng) -> Result<Value, SampleError>
            + Send
            + Sync
            + 'static,
        E: Fn(&GeneratorArgs<'_>) -> Vec<Value> + Send + Sync + 'static,
    {
        let entry = GeneratorEntry {
            sample: Arc::new(sample),
            edge_cases: Arc::new(edge_cases),
        };
        if self.entries.insert(name.to_string(), entry).is_some() {
            tracing::debug!("Replaced generator '{}'", name);
        }
    }

    /// Make `alias` resolve to the same generator as `name`.
    pub fn alias(&mut self, alias: &str, name: &str) {
        if let Some(entry) = self.entries.get(name).cloned() {
            self.entries.insert(alias.to_string(), entry);
        }
    }

    pub fn get(&self, name: &str) -> Option<&GeneratorEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generators", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn args(params: &GeneratorParams) -> GeneratorArgs<'_> {
        GeneratorArgs {
            params,
            row_index: 0,
            base_time: chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_register_and_dispatch_custom_generator() {
        let mut registry = GeneratorRegistry::new();
        registry.register_with_edge_cases(
            "npi",
            |_, rng| Ok(Value::Int(rng.random_range(1_000_000_000..2_000_000_000))),
            |_| vec![Value::Int(1_000_000_000)],
        );

        let params = GeneratorParams::default();
        let mut rng = StdRng::seed_from_u64(42);
        let entry = registry.get("npi").unwrap();
        let value = entry.sample(&args(&params), &mut rng).unwrap();
        assert!(matches!(value, Value::Int(1_000_000_000..=1_999_999_999)));
        assert_eq!(entry.edge_cases(&args(&params)), vec![Value::Int(1_000_000_000)]);
    }

    #[test]
    fn test_alias_shares_entry() {
        let mut registry = GeneratorRegistry::new();
        registry.register("answer", |_, _| Ok(Value::Int(42)));
        registry.alias("reply", "answer");
        registry.alias("ghost", "missing");

        assert!(registry.contains("reply"));
        assert!(!registry.contains("ghost"));
        assert_eq!(registry.names(), vec!["answer", "reply"]);
    }

    #[test]
    fn test_builtins_are_registered() {
        let registry = GeneratorRegistry::with_builtins();
        for name in [
            "normal",
            "lognormal",
            "weighted_categorical",
            "categorical",
            "weighted_range",
            "distribution",
            "email",
            "credit_score",
            "loan_amount",
            "product_price",
            "diagnosis_code",
            "blood_type",
        ] {
            assert!(registry.contains(name), "missing builtin '{}'", name);
        }
    }
}
