//! Row generation: planning, value resolution and the run loop.

pub mod coerce;
pub mod dataset;
pub mod engine;
pub mod keys;
pub mod plan;
pub mod providers;
pub mod registry;
pub mod unique;
pub mod value;

pub use dataset::{Dataset, Row, TableData};
pub use engine::{execute_plan, generate, ProgressFn};
pub use keys::{KeyPoolError, KeyTracker};
pub use plan::{ColumnOverride, ColumnStrategy, GenerateOptions, GenerationPlan};
pub use registry::{GeneratorArgs, GeneratorEntry, GeneratorRegistry, SampleError};
pub use value::Value;
