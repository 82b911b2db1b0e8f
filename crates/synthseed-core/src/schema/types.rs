use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::schema::document::GeneratorParams;

/// A schema that passed validation, indexed for generation.
///
/// Tables are keyed by name and every foreign key already carries the
/// referenced table's position, so lookups during generation never scan.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedSchema {
    pub name: String,
    pub version: String,
    pub description: String,
    pub database_types: Vec<DatabaseType>,
    /// Tables in `generation_order` order.
    pub tables: IndexMap<String, Table>,
    pub generation_order: Vec<String>,
    /// Non-fatal findings (e.g. `relationships[]` disagreeing with inline
    /// foreign keys).
    pub warnings: Vec<String>,
}

impl ValidatedSchema {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn column_count(&self) -> usize {
        self.tables.values().map(|t| t.columns.len()).sum()
    }

    pub fn foreign_key_count(&self) -> usize {
        self.tables
            .values()
            .flat_map(|t| t.columns.iter())
            .filter(|c| c.foreign_key.is_some())
            .count()
    }

    pub fn total_record_count(&self) -> usize {
        self.tables.values().map(|t| t.record_count).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseType {
    PostgreSQL,
    MySQL,
    SQLite,
}

impl DatabaseType {
    /// Parse a compatibility tag from a schema document.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(DatabaseType::PostgreSQL),
            "mysql" | "mariadb" => Some(DatabaseType::MySQL),
            "sqlite" | "sqlite3" => Some(DatabaseType::SQLite),
            _ => None,
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseType::PostgreSQL => write!(f, "PostgreSQL"),
            DatabaseType::MySQL => write!(f, "MySQL"),
            DatabaseType::SQLite => write!(f, "SQLite"),
        }
    }
}

/// A validated table.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    pub name: String,
    pub description: String,
    pub record_count: usize,
    /// Position in `generation_order`.
    pub position: usize,
    pub columns: Vec<Column>,
    /// Index into `columns` of the single primary key column.
    pub primary_key: usize,
}

impl Table {
    pub fn primary_key_column(&self) -> &Column {
        &self.columns[self.primary_key]
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// A validated column.
#[derive(Debug, Clone, Serialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub nullable: bool,
    pub unique: bool,
    pub generator: Option<String>,
    pub params: GeneratorParams,
    pub foreign_key: Option<ForeignKey>,
}

impl Column {
    /// Primary keys are implicitly unique.
    pub fn requires_unique(&self) -> bool {
        self.unique || self.primary_key
    }
}

/// A resolved foreign key. Read-only once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    pub referenced_table: String,
    pub referenced_column: String,
    /// Position of the referenced table in `generation_order` (and in
    /// `ValidatedSchema::tables`).
    pub referenced_position: usize,
    pub on_delete: ForeignKeyAction,
    pub on_update: ForeignKeyAction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForeignKeyAction {
    Cascade,
    SetNull,
    #[default]
    Restrict,
}

impl ForeignKeyAction {
    /// Parse one of the three accepted actions. Anything else is rejected.
    pub fn parse_action(s: &str) -> Option<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_uppercase().replace('_', " ").as_str() {
            "CASCADE" => Some(ForeignKeyAction::Cascade),
            "SET NULL" => Some(ForeignKeyAction::SetNull),
            "RESTRICT" => Some(ForeignKeyAction::Restrict),
            _ => None,
        }
    }
}

impl fmt::Display for ForeignKeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForeignKeyAction::Cascade => write!(f, "CASCADE"),
            ForeignKeyAction::SetNull => write!(f, "SET NULL"),
            ForeignKeyAction::Restrict => write!(f, "RESTRICT"),
        }
    }
}

/// The families of the type vocabulary. Every declared type maps to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeFamily {
    Integer,
    Decimal,
    String,
    DateTime,
    Boolean,
    Json,
    Enum,
}

impl fmt::Display for TypeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeFamily::Integer => write!(f, "integer"),
            TypeFamily::Decimal => write!(f, "decimal"),
            TypeFamily::String => write!(f, "string"),
            TypeFamily::DateTime => write!(f, "date-time"),
            TypeFamily::Boolean => write!(f, "boolean"),
            TypeFamily::Json => write!(f, "json"),
            TypeFamily::Enum => write!(f, "enum"),
        }
    }
}

/// Normalized data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    SmallInt,
    Integer,
    BigInt,
    Serial,
    BigSerial,
    Numeric,
    Float,
    Double,
    Char,
    VarChar,
    Text,
    Uuid,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Boolean,
    Json,
    Jsonb,
    Enum,
}

impl DataType {
    pub fn family(&self) -> TypeFamily {
        match self {
            DataType::SmallInt
            | DataType::Integer
            | DataType::BigInt
            | DataType::Serial
            | DataType::BigSerial => TypeFamily::Integer,
            DataType::Numeric | DataType::Float | DataType::Double => TypeFamily::Decimal,
            DataType::Char | DataType::VarChar | DataType::Text | DataType::Uuid => {
                TypeFamily::String
            }
            DataType::Date | DataType::Time | DataType::Timestamp | DataType::TimestampTz => {
                TypeFamily::DateTime
            }
            DataType::Boolean => TypeFamily::Boolean,
            DataType::Json | DataType::Jsonb => TypeFamily::Json,
            DataType::Enum => TypeFamily::Enum,
        }
    }

    /// Inclusive bounds of the storage type, for integer edge cases.
    pub fn integer_bounds(&self) -> Option<(i64, i64)> {
        match self {
            DataType::SmallInt => Some((i16::MIN as i64, i16::MAX as i64)),
            DataType::Integer | DataType::Serial => Some((i32::MIN as i64, i32::MAX as i64)),
            DataType::BigInt | DataType::BigSerial => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }
}

/// The closed type vocabulary: declared-type prefix → normalized type.
///
/// A declared type matches an entry when it starts with the prefix and the
/// next character (if any) is not part of an identifier, so `INT(11)`
/// matches `INT` but `INTERVAL` does not. The longest matching prefix wins
/// (`CHARACTER VARYING` beats `CHARACTER`).
const TYPE_VOCABULARY: &[(&str, DataType)] = &[
    // Integer family
    ("SMALLINT", DataType::SmallInt),
    ("TINYINT", DataType::SmallInt),
    ("INT2", DataType::SmallInt),
    ("INT", DataType::Integer),
    ("INTEGER", DataType::Integer),
    ("MEDIUMINT", DataType::Integer),
    ("INT4", DataType::Integer),
    ("BIGINT", DataType::BigInt),
    ("INT8", DataType::BigInt),
    ("SERIAL", DataType::Serial),
    ("BIGSERIAL", DataType::BigSerial),
    // Decimal family
    ("DECIMAL", DataType::Numeric),
    ("NUMERIC", DataType::Numeric),
    ("MONEY", DataType::Numeric),
    ("FLOAT", DataType::Float),
    ("REAL", DataType::Float),
    ("DOUBLE", DataType::Double),
    ("DOUBLE PRECISION", DataType::Double),
    // String family
    ("CHAR", DataType::Char),
    ("CHARACTER", DataType::Char),
    ("NCHAR", DataType::Char),
    ("VARCHAR", DataType::VarChar),
    ("NVARCHAR", DataType::VarChar),
    ("CHARACTER VARYING", DataType::VarChar),
    ("TEXT", DataType::Text),
    ("TINYTEXT", DataType::Text),
    ("MEDIUMTEXT", DataType::Text),
    ("LONGTEXT", DataType::Text),
    ("CLOB", DataType::Text),
    ("UUID", DataType::Uuid),
    // Date-time family
    ("DATE", DataType::Date),
    ("TIME", DataType::Time),
    ("DATETIME", DataType::Timestamp),
    ("TIMESTAMP", DataType::Timestamp),
    ("TIMESTAMPTZ", DataType::TimestampTz),
    // Boolean family
    ("BOOLEAN", DataType::Boolean),
    ("BOOL", DataType::Boolean),
    // JSON family
    ("JSON", DataType::Json),
    ("JSONB", DataType::Jsonb),
    // Enum family
    ("ENUM", DataType::Enum),
];

static TYPE_ARGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\)").expect("type argument pattern is valid")
});

static ENUM_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'((?:[^']|'')*)'").expect("enum value pattern is valid"));

/// A declared column type, resolved against the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnType {
    pub data_type: DataType,
    /// The type string as declared in the document.
    pub raw: String,
    /// `VARCHAR(n)` / `CHAR(n)` length.
    pub length: Option<u32>,
    /// `DECIMAL(p, s)` precision.
    pub precision: Option<u32>,
    /// `DECIMAL(p, s)` scale.
    pub scale: Option<u32>,
    /// `ENUM('a', 'b')` members.
    pub enum_values: Vec<String>,
}

impl ColumnType {
    /// Resolve a declared type string. Returns `None` for types outside the
    /// vocabulary.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_uppercase();

        let (prefix, data_type) = TYPE_VOCABULARY
            .iter()
            .filter(|(prefix, _)| matches_prefix(&normalized, prefix))
            .max_by_key(|(prefix, _)| prefix.len())?;

        let mut data_type = *data_type;
        if data_type == DataType::Timestamp && normalized.contains("WITH TIME ZONE") {
            data_type = DataType::TimestampTz;
        }

        let rest = normalized[prefix.len()..].trim_start();
        let mut column_type = ColumnType {
            data_type,
            raw: raw.trim().to_string(),
            length: None,
            precision: None,
            scale: None,
            enum_values: Vec::new(),
        };

        match data_type.family() {
            TypeFamily::String => {
                column_type.length = TYPE_ARGS
                    .captures(rest)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse().ok());
            }
            TypeFamily::Decimal => {
                if let Some(caps) = TYPE_ARGS.captures(rest) {
                    column_type.precision = caps.get(1).and_then(|m| m.as_str().parse().ok());
                    column_type.scale = caps.get(2).and_then(|m| m.as_str().parse().ok());
                }
            }
            TypeFamily::Enum => {
                // Use the original casing for member names.
                let original_rest = &raw.trim()[prefix.len()..];
                column_type.enum_values = ENUM_VALUE
                    .captures_iter(original_rest)
                    .filter_map(|c| c.get(1))
                    .map(|m| m.as_str().replace("''", "'"))
                    .collect();
            }
            _ => {}
        }

        Some(column_type)
    }

    pub fn family(&self) -> TypeFamily {
        self.data_type.family()
    }
}

fn matches_prefix(normalized: &str, prefix: &str) -> bool {
    normalized.starts_with(prefix)
        && normalized[prefix.len()..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_family_prefixes() {
        for raw in ["INT", "int(11)", "INTEGER", "bigint", "SMALLINT", "serial"] {
            let ct = ColumnType::parse(raw).unwrap_or_else(|| panic!("{} should parse", raw));
            assert_eq!(ct.family(), TypeFamily::Integer, "{}", raw);
        }
    }

    #[test]
    fn test_prefix_requires_word_boundary() {
        assert!(ColumnType::parse("INTERVAL").is_none());
        assert!(ColumnType::parse("BOOLEANISH").is_none());
        assert!(ColumnType::parse("GEOMETRY").is_none());
    }

    #[test]
    fn test_longest_prefix_wins() {
        let ct = ColumnType::parse("character varying(64)").unwrap();
        assert_eq!(ct.data_type, DataType::VarChar);
        assert_eq!(ct.length, Some(64));

        let ct = ColumnType::parse("DATETIME").unwrap();
        assert_eq!(ct.data_type, DataType::Timestamp);

        let ct = ColumnType::parse("DOUBLE PRECISION").unwrap();
        assert_eq!(ct.data_type, DataType::Double);
    }

    #[test]
    fn test_varchar_length() {
        let ct = ColumnType::parse("VARCHAR(255)").unwrap();
        assert_eq!(ct.family(), TypeFamily::String);
        assert_eq!(ct.length, Some(255));
    }

    #[test]
    fn test_decimal_precision_and_scale() {
        let ct = ColumnType::parse("DECIMAL(12, 2)").unwrap();
        assert_eq!(ct.family(), TypeFamily::Decimal);
        assert_eq!(ct.precision, Some(12));
        assert_eq!(ct.scale, Some(2));
    }

    #[test]
    fn test_enum_values_keep_case() {
        let ct = ColumnType::parse("ENUM('Active', 'Paid Off', 'it''s')").unwrap();
        assert_eq!(ct.family(), TypeFamily::Enum);
        assert_eq!(ct.enum_values, vec!["Active", "Paid Off", "it's"]);
    }

    #[test]
    fn test_timestamp_with_time_zone() {
        let ct = ColumnType::parse("timestamp with time zone").unwrap();
        assert_eq!(ct.data_type, DataType::TimestampTz);
        assert_eq!(ct.family(), TypeFamily::DateTime);
    }

    #[test]
    fn test_foreign_key_actions() {
        assert_eq!(
            ForeignKeyAction::parse_action("cascade"),
            Some(ForeignKeyAction::Cascade)
        );
        assert_eq!(
            ForeignKeyAction::parse_action("SET  NULL"),
            Some(ForeignKeyAction::SetNull)
        );
        assert_eq!(
            ForeignKeyAction::parse_action("set_null"),
            Some(ForeignKeyAction::SetNull)
        );
        assert_eq!(
            ForeignKeyAction::parse_action("RESTRICT"),
            Some(ForeignKeyAction::Restrict)
        );
        assert_eq!(ForeignKeyAction::parse_action("NO ACTION"), None);
        assert_eq!(ForeignKeyAction::parse_action("SET DEFAULT"), None);
    }

    #[test]
    fn test_database_type_tags() {
        assert_eq!(DatabaseType::parse("Postgres"), Some(DatabaseType::PostgreSQL));
        assert_eq!(DatabaseType::parse("mariadb"), Some(DatabaseType::MySQL));
        assert_eq!(DatabaseType::parse("oracle"), None);
    }
}
