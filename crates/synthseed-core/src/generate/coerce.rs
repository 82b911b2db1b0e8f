//! Fit generated values to the column's declared type.
//!
//! Generators are type-agnostic (a `normal` sampler returns a float even for
//! an `INTEGER` column), so every value passes through [`coerce`] before it
//! is stored.

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::distribution::round_to;
use crate::generate::value::Value;
use crate::schema::types::{ColumnType, DataType, TypeFamily};

/// Default number of decimal places for decimal columns without a scale.
const DEFAULT_SCALE: u32 = 2;

/// Convert a value to the column's type family.
///
/// A value with no sensible representation in that type (a word in an
/// integer column, a non-member in an enum column) is handed back as the
/// error, so the caller can name it.
pub fn coerce(value: Value, column_type: &ColumnType) -> Result<Value, Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    match column_type.family() {
        TypeFamily::Integer => {
            let v = match &value {
                Value::Int(i) => *i,
                other => match other.as_f64().filter(|f| f.is_finite()) {
                    Some(f) => f.round() as i64,
                    None => return Err(value),
                },
            };
            let (min, max) = column_type
                .data_type
                .integer_bounds()
                .unwrap_or((i64::MIN, i64::MAX));
            Ok(Value::Int(v.clamp(min, max)))
        }
        TypeFamily::Decimal => {
            let Some(f) = value.as_f64().filter(|f| f.is_finite()) else {
                return Err(value);
            };
            let f = match column_type.precision {
                Some(p) if p > column_type.scale.unwrap_or(DEFAULT_SCALE) => {
                    let scale = column_type.scale.unwrap_or(DEFAULT_SCALE);
                    let limit = 10f64.powi((p - scale) as i32) - 10f64.powi(-(scale as i32));
                    f.clamp(-limit, limit)
                }
                _ => f,
            };
            Ok(Value::Float(match decimal_places(column_type) {
                Some(places) => round_to(f, places),
                None => f,
            }))
        }
        TypeFamily::String => {
            if column_type.data_type == DataType::Uuid {
                return match value {
                    Value::Uuid(u) => Ok(Value::Uuid(u)),
                    other => match Uuid::parse_str(&other.to_csv_string()) {
                        Ok(u) => Ok(Value::Uuid(u)),
                        Err(_) => Err(other),
                    },
                };
            }
            let s = match value {
                Value::String(s) => s,
                other => Cow::Owned(other.to_csv_string()),
            };
            Ok(Value::String(truncate(s, column_type.length)))
        }
        TypeFamily::DateTime => coerce_temporal(value, column_type.data_type),
        TypeFamily::Boolean => {
            let b = match &value {
                Value::Bool(b) => Some(*b),
                Value::Int(i) => Some(*i != 0),
                Value::String(s) => match s.trim().to_lowercase().as_str() {
                    "true" | "t" | "yes" | "y" | "1" => Some(true),
                    "false" | "f" | "no" | "n" | "0" => Some(false),
                    _ => None,
                },
                _ => None,
            };
            b.map(Value::Bool).ok_or(value)
        }
        TypeFamily::Json => match value {
            Value::Json(j) => Ok(Value::Json(j)),
            other => Ok(Value::Json(other.to_json())),
        },
        TypeFamily::Enum => {
            let s = match &value {
                Value::String(s) => s.to_string(),
                other => other.to_csv_string(),
            };
            if column_type.enum_values.is_empty() || column_type.enum_values.contains(&s) {
                Ok(Value::String(Cow::Owned(s)))
            } else {
                Err(value)
            }
        }
    }
}

/// Decimal places a numeric column stores. Integers store none; floating
/// columns without a declared scale keep whatever they are given.
pub fn decimal_places(column_type: &ColumnType) -> Option<u32> {
    match (column_type.family(), column_type.data_type) {
        (TypeFamily::Integer, _) => Some(0),
        (TypeFamily::Decimal, DataType::Numeric) => {
            Some(column_type.scale.unwrap_or(DEFAULT_SCALE))
        }
        (TypeFamily::Decimal, _) => column_type.scale,
        _ => None,
    }
}

fn coerce_temporal(value: Value, data_type: DataType) -> Result<Value, Value> {
    if let Value::Time(t) = value {
        return if data_type == DataType::Time {
            Ok(Value::Time(t))
        } else {
            Err(value)
        };
    }

    let timestamp = match &value {
        Value::Timestamp(ts) => Some(*ts),
        Value::Date(d) => Some(d.and_time(NaiveTime::MIN)),
        Value::String(s) => parse_timestamp(s),
        _ => None,
    };
    let Some(timestamp) = timestamp else {
        return Err(value);
    };

    Ok(match data_type {
        DataType::Date => Value::Date(timestamp.date()),
        DataType::Time => Value::Time(timestamp.time()),
        _ => Value::Timestamp(timestamp),
    })
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Truncate to at most `length` characters (not bytes).
fn truncate(s: Cow<'static, str>, length: Option<u32>) -> Cow<'static, str> {
    match length {
        Some(len) if s.chars().count() > len as usize => {
            Cow::Owned(s.chars().take(len as usize).collect())
        }
        _ => s,
    }
}
