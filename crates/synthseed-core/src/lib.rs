pub mod config;
pub mod distribution;
pub mod error;
pub mod generate;
pub mod graph;
pub mod lock;
pub mod output;
pub mod schema;

// Re-export key types for convenience
pub use error::{GenerationError, Result, SynthSeedError, ValidationError, ValidationErrorKind};
pub use generate::{generate, Dataset, GenerateOptions, GeneratorRegistry, TableData, Value};
pub use schema::{load_schema, validate, RawSchema, ValidatedSchema};
