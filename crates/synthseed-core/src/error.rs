//! # Error Types
//!
//! Two taxonomies live here. [`ValidationError`] describes a structural or
//! referential problem in the schema document itself and always carries the
//! table/column position it was found at. [`GenerationError`] describes a
//! runtime failure while producing rows. Both roll up into
//! [`SynthSeedError`], the single error type returned across the crate.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// All errors that can occur in synthseed operations.
#[derive(Error, Debug)]
pub enum SynthSeedError {
    #[error("Schema validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Failed to read schema document {path}: {message}")]
    Schema { path: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Lock file error: {message}")]
    LockFile { message: String },

    #[error("Output error: {message}: {source}")]
    Output {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SynthSeedError>;

/// Where in the schema document a validation error was found.
///
/// Indices are zero-based positions in the document's `tables[]` and
/// `columns[]` arrays, so they stay meaningful even when a name is empty
/// or duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorLocation {
    pub table_index: Option<usize>,
    pub table: Option<String>,
    pub column_index: Option<usize>,
    pub column: Option<String>,
}

impl ErrorLocation {
    pub fn schema() -> Self {
        Self::default()
    }

    pub fn table(index: usize, name: &str) -> Self {
        Self {
            table_index: Some(index),
            table: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn column(table_index: usize, table: &str, column_index: usize, column: &str) -> Self {
        Self {
            table_index: Some(table_index),
            table: Some(table.to_string()),
            column_index: Some(column_index),
            column: Some(column.to_string()),
        }
    }
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(idx) = self.table_index {
            write!(
                f,
                "table[{}] '{}'",
                idx,
                self.table.as_deref().unwrap_or_default()
            )?;
            if let Some(col_idx) = self.column_index {
                write!(
                    f,
                    ", column[{}] '{}'",
                    col_idx,
                    self.column.as_deref().unwrap_or_default()
                )?;
            }
            write!(f, ": ")?;
        }
        Ok(())
    }
}

/// A structural or referential problem in a schema document.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{location}{kind}")]
pub struct ValidationError {
    pub location: ErrorLocation,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(location: ErrorLocation, kind: ValidationErrorKind) -> Self {
        Self { location, kind }
    }

    pub fn table_name(&self) -> Option<&str> {
        self.location.table.as_deref()
    }

    pub fn column_name(&self) -> Option<&str> {
        self.location.column.as_deref()
    }
}

/// The cause of a [`ValidationError`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationErrorKind {
    #[error("schema has no name")]
    MissingSchemaName,

    #[error("schema defines no tables")]
    NoTables,

    #[error("schema lists no database_type; expected at least one of postgresql, mysql, sqlite")]
    NoDatabaseType,

    #[error("none of the listed database types ({values}) is supported; expected postgresql, mysql or sqlite")]
    UnsupportedDatabaseTypes { values: String },

    #[error("table has an empty name")]
    EmptyTableName,

    #[error("duplicate table name '{name}'")]
    DuplicateTable { name: String },

    #[error("table defines no columns")]
    NoColumns,

    #[error("record_count must be a positive integer, got {value}")]
    NonPositiveRecordCount { value: i64 },

    #[error("table has no primary key column; exactly one column must set primary_key = true")]
    NoPrimaryKey,

    #[error("table has {count} primary key columns ({columns}); exactly one is required")]
    MultiplePrimaryKeys { count: usize, columns: String },

    #[error("column has an empty name")]
    EmptyColumnName,

    #[error("duplicate column name '{name}'")]
    DuplicateColumn { name: String },

    #[error("unrecognized data type '{declared}'")]
    UnknownDataType { declared: String },

    #[error("enum type '{declared}' declares no values")]
    EmptyEnum { declared: String },

    #[error("invalid generator_params: {reason}")]
    InvalidGeneratorParams { reason: String },

    #[error("foreign key references table '{referenced_table}', which does not exist")]
    UnknownReferencedTable { referenced_table: String },

    #[error("foreign key references column '{referenced_table}.{referenced_column}', which does not exist")]
    UnknownReferencedColumn {
        referenced_table: String,
        referenced_column: String,
    },

    #[error("foreign key references '{referenced_table}.{referenced_column}', which is not the primary key of '{referenced_table}'")]
    ReferencedColumnNotPrimaryKey {
        referenced_table: String,
        referenced_column: String,
    },

    #[error("invalid foreign key {field} action '{value}'; expected CASCADE, SET NULL or RESTRICT")]
    InvalidForeignKeyAction { field: &'static str, value: String },

    #[error("generation_order lists unknown table '{table}'")]
    UnknownTableInGenerationOrder { table: String },

    #[error("generation_order lists table '{table}' more than once")]
    DuplicateInGenerationOrder { table: String },

    #[error("table is missing from generation_order")]
    MissingFromGenerationOrder,

    #[error(
        "ordering conflict: '{table}' (generation_order position {table_position}) references \
         '{referenced_table}' (position {referenced_position}) via column '{column}', but \
         '{referenced_table}' must be generated before '{table}'{hint}"
    )]
    GenerationOrderConflict {
        table: String,
        table_position: usize,
        column: String,
        referenced_table: String,
        referenced_position: usize,
        hint: String,
    },
}

/// A runtime failure while producing rows. Always fatal to the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Unknown generator '{generator}' for {table}.{column}")]
    UnknownGenerator {
        table: String,
        column: String,
        generator: String,
    },

    #[error("Generator '{generator}' failed for {table}.{column}: {message}")]
    Generator {
        table: String,
        column: String,
        generator: String,
        message: String,
    },

    #[error("Foreign key resolution failed: {table}.{column} references {referenced_table}.{referenced_column}, but {referenced_table} has no generated keys (generation order violated)")]
    EmptyKeyPool {
        table: String,
        column: String,
        referenced_table: String,
        referenced_column: String,
    },

    #[error("Key pool for '{table}' is frozen; no keys may be recorded after its generation completed")]
    PoolFrozen { table: String },

    #[error("Key pool for '{table}' is still being generated; foreign keys may only reference completed tables")]
    PoolIncomplete { table: String },

    #[error("Failed to generate unique value for {table}.{column} at row {row_index}: {max_retries} retries exhausted\n  Consider lowering the record count or widening the column's generator")]
    UniqueExhausted {
        table: String,
        column: String,
        row_index: usize,
        max_retries: usize,
    },

    #[error("Invalid record count override for '{table}': {rows} (must be positive)")]
    InvalidOverride { table: String, rows: usize },

    #[error("Cannot allocate {rows} rows for '{table}'; lower its record_count or override")]
    TooManyRows { table: String, rows: usize },

    #[error("Invalid base_time {base_time}: the year must be between 1 and 9999")]
    InvalidBaseTime { base_time: String },

    #[error("Generation cancelled{}", .table.as_ref().map(|t| format!(" while generating '{}'", t)).unwrap_or_default())]
    Cancelled { table: Option<String> },
}
