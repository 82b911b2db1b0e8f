pub mod document;
pub mod types;
pub mod validate;

pub use document::{load_schema, GeneratorParams, RawSchema};
pub use types::{ColumnType, DataType, DatabaseType, TypeFamily, ValidatedSchema};
pub use validate::validate;
