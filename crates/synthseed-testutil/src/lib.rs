use serde_json::{json, Value as JsonValue};
use synthseed_core::schema::{validate, RawSchema, ValidatedSchema};

/// Consumer lending: borrowers → loans → payments.
pub const LENDING_JSON: &str = include_str!("../../../schemas/lending.json");
/// Retail store: customers, products → orders → order_items.
pub const RETAIL_JSON: &str = include_str!("../../../schemas/retail.json");
/// Outpatient clinic: providers → patients → encounters.
pub const HEALTHCARE_JSON: &str = include_str!("../../../schemas/healthcare.json");

/// Parse a schema document, panicking on malformed JSON.
pub fn raw_schema(json: &str) -> RawSchema {
    RawSchema::from_json_str(json).unwrap_or_else(|e| panic!("fixture does not parse: {}", e))
}

/// Parse a schema document from a `json!` value.
pub fn raw_schema_from_value(value: JsonValue) -> RawSchema {
    serde_json::from_value(value).unwrap_or_else(|e| panic!("fixture does not parse: {}", e))
}

/// Validate a fixture, panicking with the validation error if it fails.
pub fn validated(raw: &RawSchema) -> ValidatedSchema {
    validate(raw).unwrap_or_else(|e| panic!("fixture does not validate: {}", e))
}

pub fn lending_schema() -> ValidatedSchema {
    validated(&raw_schema(LENDING_JSON))
}

pub fn retail_schema() -> ValidatedSchema {
    validated(&raw_schema(RETAIL_JSON))
}

pub fn healthcare_schema() -> ValidatedSchema {
    validated(&raw_schema(HEALTHCARE_JSON))
}

/// The two-table borrowers/loans document: 250 borrowers with a sequential
/// `id`, 1000 loans each pointing at one borrower.
pub fn borrowers_loans_document() -> JsonValue {
    json!({
        "schema_version": "1.0",
        "name": "borrowers_loans",
        "database_type": ["postgresql"],
        "tables": [
            {
                "name": "borrowers",
                "record_count": 250,
                "columns": [
                    {"name": "id", "type": "INTEGER", "primary_key": true, "auto_increment": true},
                    {"name": "full_name", "type": "VARCHAR(100)", "generator": "full_name"},
                    {"name": "credit_score", "type": "INTEGER", "generator": "credit_score"},
                    {"name": "middle_name", "type": "VARCHAR(50)", "generator": "first_name",
                     "nullable": true, "generator_params": {"null_probability": 0.10}}
                ]
            },
            {
                "name": "loans",
                "record_count": 1000,
                "columns": [
                    {"name": "id", "type": "INTEGER", "primary_key": true, "auto_increment": true},
                    {"name": "borrower_id", "type": "INTEGER",
                     "foreign_key": {"table": "borrowers", "column": "id"}},
                    {"name": "loan_status", "type": "VARCHAR(20)", "generator": "weighted_categorical",
                     "generator_params": {
                         "values": ["current", "late", "default"],
                         "weights": [0.70, 0.20, 0.10]
                     }},
                    {"name": "loan_amount", "type": "DECIMAL(12,2)", "generator": "loan_amount"}
                ]
            }
        ],
        "generation_order": ["borrowers", "loans"]
    })
}

pub fn borrowers_loans() -> ValidatedSchema {
    validated(&raw_schema_from_value(borrowers_loans_document()))
}

/// Same document with `loans` listed before the table it references.
pub fn misordered_document() -> JsonValue {
    let mut doc = borrowers_loans_document();
    doc["generation_order"] = json!(["loans", "borrowers"]);
    doc
}

/// A wide single-table schema for benchmarks.
pub fn wide_table_document(rows: usize) -> JsonValue {
    json!({
        "name": "wide",
        "database_type": "sqlite",
        "tables": [{
            "name": "events",
            "record_count": rows,
            "columns": [
                {"name": "id", "type": "BIGINT", "primary_key": true},
                {"name": "uuid", "type": "UUID", "generator": "uuid", "unique": true},
                {"name": "email", "type": "VARCHAR(255)", "generator": "email"},
                {"name": "amount", "type": "DECIMAL(10,2)", "generator": "lognormal",
                 "generator_params": {"median": 50, "max": 5000}},
                {"name": "score", "type": "INTEGER", "generator": "normal",
                 "generator_params": {"mean": 100, "std_dev": 15}},
                {"name": "kind", "type": "VARCHAR(20)", "generator": "categorical",
                 "generator_params": {"values": ["view", "click", "buy"], "weights": [80, 15, 5]}},
                {"name": "active", "type": "BOOLEAN", "generator": "boolean"},
                {"name": "at", "type": "TIMESTAMP", "generator": "timestamp"},
                {"name": "payload", "type": "JSON", "nullable": true}
            ]
        }],
        "generation_order": ["events"]
    })
}
