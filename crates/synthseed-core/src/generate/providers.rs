use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use fake::faker::address::en::*;
use fake::faker::company::en::*;
use fake::faker::internet::en::*;
use fake::faker::lorem::en::*;
use fake::faker::name::en::*;
use fake::faker::phone_number::en::*;
use fake::Fake;
use rand::rngs::StdRng;
use rand::Rng;
use uuid::Uuid;

use crate::distribution;
use crate::generate::registry::{GeneratorArgs, GeneratorRegistry, SampleError};
use crate::generate::value::Value;
use crate::schema::document::GeneratorParams;
use crate::schema::types::{ColumnType, DataType, TypeFamily};

/// Wrap a dynamically generated String into a Value::String.
#[inline]
fn owned(s: String) -> Value {
    Value::String(Cow::Owned(s))
}

/// Wrap a static string literal into a Value::String (zero heap allocation).
#[inline]
fn borrowed(s: &'static str) -> Value {
    Value::String(Cow::Borrowed(s))
}

// === Vertical lookup tables (value, weight) ===

const LOAN_STATUSES: &[(&str, f64)] = &[
    ("current", 70.0),
    ("paid_off", 15.0),
    ("late_30", 6.0),
    ("late_60", 3.0),
    ("default", 4.0),
    ("charged_off", 2.0),
];

const LOAN_TERMS_MONTHS: &[(i64, f64)] = &[
    (12, 5.0),
    (24, 10.0),
    (36, 35.0),
    (48, 10.0),
    (60, 25.0),
    (72, 5.0),
    (84, 2.0),
    (120, 3.0),
    (180, 2.0),
    (360, 3.0),
];

const LOAN_AMOUNT_RANGES: &[[f64; 2]] = &[
    [1_000.0, 5_000.0],
    [5_000.0, 25_000.0],
    [25_000.0, 100_000.0],
    [100_000.0, 500_000.0],
];
const LOAN_AMOUNT_WEIGHTS: &[f64] = &[30.0, 40.0, 20.0, 10.0];

const ORDER_STATUSES: &[(&str, f64)] = &[
    ("delivered", 55.0),
    ("shipped", 15.0),
    ("processing", 10.0),
    ("pending", 8.0),
    ("cancelled", 7.0),
    ("returned", 5.0),
];

/// Common ICD-10-CM codes, weighted roughly by outpatient frequency.
const DIAGNOSIS_CODES: &[(&str, f64)] = &[
    ("I10", 18.0),
    ("E11.9", 12.0),
    ("E78.5", 10.0),
    ("J06.9", 9.0),
    ("M54.5", 8.0),
    ("F41.1", 6.0),
    ("F32.9", 6.0),
    ("K21.9", 5.0),
    ("J45.909", 5.0),
    ("N39.0", 4.0),
    ("E66.9", 4.0),
    ("R51", 3.0),
    ("Z00.00", 3.0),
    ("M17.11", 2.0),
    ("I48.91", 2.0),
    ("C50.919", 1.0),
    ("G30.9", 1.0),
    ("A41.9", 1.0),
];

const BLOOD_TYPES: &[(&str, f64)] = &[
    ("O+", 37.4),
    ("A+", 35.7),
    ("B+", 8.5),
    ("O-", 6.6),
    ("A-", 6.3),
    ("AB+", 3.4),
    ("B-", 1.5),
    ("AB-", 0.6),
];

/// Register every built-in generator.
pub fn register_builtins(registry: &mut GeneratorRegistry) {
    // === Distributions ===
    registry.register_with_edge_cases("normal", sample_normal, |a| {
        bound_edges(a.params, None, None)
    });
    registry.register_with_edge_cases("lognormal", sample_lognormal, |a| {
        bound_edges(a.params, Some(0.0), None)
    });
    registry.alias("log_normal", "lognormal");
    registry.register_with_edge_cases(
        "weighted_categorical",
        sample_categorical,
        |a| categorical_edges(a.params),
    );
    registry.alias("categorical", "weighted_categorical");
    registry.register_with_edge_cases("weighted_range", sample_weighted_range, |a| {
        range_edges(a.params)
    });
    registry.register_with_edge_cases(
        "uniform_int",
        |a, rng| {
            let (min, max) = int_bounds(a.params, 0, 100);
            Ok(Value::Int(distribution::uniform_int(rng, min, max)))
        },
        |a| {
            let (min, max) = int_bounds(a.params, 0, 100);
            vec![Value::Int(min), Value::Int(max)]
        },
    );
    registry.register_with_edge_cases(
        "uniform_float",
        |a, rng| {
            let (min, max) = (a.params.min.unwrap_or(0.0), a.params.max.unwrap_or(1.0));
            let v = distribution::uniform(rng, min, max);
            bounded_float(a.params, 2, v, min, max)
        },
        |a| bound_edges(a.params, Some(0.0), Some(1.0)),
    );
    registry.alias("uniform", "uniform_float");
    registry.register_with_edge_cases(
        "boolean",
        |a, rng| {
            let probability = a.params.probability.unwrap_or(0.5).clamp(0.0, 1.0);
            Ok(Value::Bool(rng.random_bool(probability)))
        },
        |_| vec![Value::Bool(true), Value::Bool(false)],
    );
    registry.register_with_edge_cases("distribution", sample_distribution, |a| {
        distribution_edges(a.params)
    });

    // === Identity / contact ===
    registry.register("first_name", |_, rng| Ok(owned(FirstName().fake_with_rng(rng))));
    registry.register("last_name", |_, rng| Ok(owned(LastName().fake_with_rng(rng))));
    registry.register("full_name", |_, rng| Ok(owned(Name().fake_with_rng(rng))));
    registry.register("email", |a, rng| {
        let email: String = SafeEmail().fake_with_rng(rng);
        Ok(match email.split_once('@') {
            Some((local, domain)) => owned(format!("{}.{}@{}", local, a.row_index, domain)),
            None => owned(format!("user{}@example.com", a.row_index)),
        })
    });
    registry.register("phone", |_, rng| Ok(owned(PhoneNumber().fake_with_rng(rng))));
    registry.register("street_address", |_, rng| {
        let number: u16 = rng.random_range(1..9999);
        let street: String = StreetName().fake_with_rng(rng);
        let suffix: String = StreetSuffix().fake_with_rng(rng);
        Ok(owned(format!("{} {} {}", number, street, suffix)))
    });
    registry.register("city", |_, rng| Ok(owned(CityName().fake_with_rng(rng))));
    registry.register("state", |_, rng| Ok(owned(StateName().fake_with_rng(rng))));
    registry.register("zip_code", |_, rng| Ok(owned(ZipCode().fake_with_rng(rng))));
    registry.register("country", |_, rng| Ok(owned(CountryName().fake_with_rng(rng))));
    registry.register("company_name", |_, rng| {
        Ok(owned(CompanyName().fake_with_rng(rng)))
    });
    registry.register("job_title", |_, rng| Ok(owned(Profession().fake_with_rng(rng))));
    registry.register("word", |_, rng| Ok(owned(Word().fake_with_rng(rng))));
    registry.register("sentence", |_, rng| Ok(owned(Sentence(5..12).fake_with_rng(rng))));
    registry.register("paragraph", |_, rng| {
        let sentences: Vec<String> = Sentences(3..6).fake_with_rng(rng);
        Ok(owned(sentences.join(" ")))
    });
    registry.register_with_edge_cases(
        "uuid",
        |_, rng| Ok(Value::Uuid(random_uuid(rng))),
        |_| vec![Value::Uuid(Uuid::nil()), Value::Uuid(Uuid::from_u128(u128::MAX))],
    );

    // === Temporal ===
    registry.register_with_edge_cases("date", sample_date, date_edges);
    registry.register_with_edge_cases("timestamp", sample_timestamp, timestamp_edges);

    // === Lending ===
    registry.register_with_edge_cases(
        "credit_score",
        |a, rng| {
            let v = distribution::normal(
                rng,
                a.params.mean.unwrap_or(690.0),
                a.params.std_dev.unwrap_or(70.0),
                a.params.min.unwrap_or(300.0),
                a.params.max.unwrap_or(850.0),
            );
            Ok(Value::Int(v.round() as i64))
        },
        |a| {
            let (min, max) = int_bounds(a.params, 300, 850);
            vec![Value::Int(min), Value::Int(max)]
        },
    );
    registry.register_with_edge_cases(
        "annual_income",
        |a, rng| log_normal_from(a.params, rng, 65_000.0, 15_000.0, 500_000.0),
        |a| bound_edges(a.params, Some(15_000.0), Some(500_000.0)),
    );
    registry.register_with_edge_cases(
        "loan_amount",
        |a, rng| {
            if a.params.median.is_some() {
                return log_normal_from(a.params, rng, 15_000.0, 1_000.0, 500_000.0);
            }
            let ranges = a.params.ranges.as_deref().unwrap_or(LOAN_AMOUNT_RANGES);
            let weights = a.params.weights.as_deref().unwrap_or(LOAN_AMOUNT_WEIGHTS);
            let v = distribution::weighted_range(rng, ranges, weights).unwrap_or_default();
            Ok(float(a.params, 2, v))
        },
        |a| {
            if a.params.ranges.is_some() {
                range_edges(a.params)
            } else {
                bound_edges(a.params, Some(1_000.0), Some(500_000.0))
            }
        },
    );
    registry.register_with_edge_cases(
        "interest_rate",
        |a, rng| {
            let (min, max) = (a.params.min.unwrap_or(2.5), a.params.max.unwrap_or(29.99));
            let v = distribution::normal(
                rng,
                a.params.mean.unwrap_or(7.5),
                a.params.std_dev.unwrap_or(2.5),
                min,
                max,
            );
            bounded_float(a.params, 2, v, min, max)
        },
        |a| bound_edges(a.params, Some(2.5), Some(29.99)),
    );
    registry.register_with_edge_cases(
        "loan_term_months",
        |a, rng| match &a.params.values {
            Some(_) => sample_categorical(a, rng),
            None => {
                let weights: Vec<f64> = LOAN_TERMS_MONTHS.iter().map(|(_, w)| *w).collect();
                let idx = distribution::weighted_index(rng, &weights).unwrap_or_default();
                Ok(Value::Int(LOAN_TERMS_MONTHS[idx].0))
            }
        },
        |a| match &a.params.values {
            Some(_) => categorical_edges(a.params),
            None => vec![Value::Int(12), Value::Int(360)],
        },
    );
    registry.register_with_edge_cases(
        "loan_status",
        |a, rng| static_categorical(a, rng, LOAN_STATUSES),
        |a| static_categorical_edges(a.params, LOAN_STATUSES),
    );

    // === Retail ===
    registry.register_with_edge_cases(
        "product_price",
        |a, rng| log_normal_from(a.params, rng, 29.99, 0.99, 2_999.99),
        |a| bound_edges(a.params, Some(0.99), Some(2_999.99)),
    );
    registry.register_with_edge_cases(
        "order_status",
        |a, rng| static_categorical(a, rng, ORDER_STATUSES),
        |a| static_categorical_edges(a.params, ORDER_STATUSES),
    );
    registry.register("sku", |a, rng| {
        let prefix = a.params.prefix.as_deref().unwrap_or("SKU");
        Ok(owned(format!(
            "{}-{:06}-{}",
            prefix,
            a.row_index + 1,
            random_alphanumeric(rng, 4).to_uppercase()
        )))
    });

    // === Healthcare ===
    registry.register_with_edge_cases(
        "diagnosis_code",
        |a, rng| static_categorical(a, rng, DIAGNOSIS_CODES),
        |a| static_categorical_edges(a.params, DIAGNOSIS_CODES),
    );
    registry.register_with_edge_cases(
        "blood_type",
        |a, rng| static_categorical(a, rng, BLOOD_TYPES),
        |a| static_categorical_edges(a.params, BLOOD_TYPES),
    );
}

// === Distribution samplers ===

fn sample_normal(args: &GeneratorArgs<'_>, rng: &mut StdRng) -> Result<Value, SampleError> {
    let p = args.params;
    let (min, max) = (
        p.min.unwrap_or(f64::NEG_INFINITY),
        p.max.unwrap_or(f64::INFINITY),
    );
    let mean = match p.mean {
        Some(mean) => mean,
        None if min.is_finite() && max.is_finite() => (min + max) / 2.0,
        None => return Err(SampleError::missing("normal", "mean")),
    };
    let std_dev = match p.std_dev {
        Some(sd) => sd,
        None if min.is_finite() && max.is_finite() => (max - min) / 6.0,
        None => return Err(SampleError::missing("normal", "std_dev")),
    };
    bounded_float(p, 2, distribution::normal(rng, mean, std_dev, min, max), min, max)
}

fn sample_lognormal(args: &GeneratorArgs<'_>, rng: &mut StdRng) -> Result<Value, SampleError> {
    let p = args.params;
    let median = p
        .median
        .or(p.mean)
        .ok_or_else(|| SampleError::missing("lognormal", "median"))?;
    log_normal_from(p, rng, median, 0.0, f64::INFINITY)
}

fn sample_categorical(args: &GeneratorArgs<'_>, rng: &mut StdRng) -> Result<Value, SampleError> {
    let values = args
        .params
        .values
        .as_deref()
        .ok_or_else(|| SampleError::missing("weighted_categorical", "values"))?;
    let weights = args.params.weights.as_deref().unwrap_or_default();
    distribution::weighted_categorical(rng, values, weights)
        .map(Value::from_json)
        .ok_or_else(|| SampleError::new("weighted_categorical has no values to draw from"))
}

fn sample_weighted_range(
    args: &GeneratorArgs<'_>,
    rng: &mut StdRng,
) -> Result<Value, SampleError> {
    let ranges = args
        .params
        .ranges
        .as_deref()
        .ok_or_else(|| SampleError::missing("weighted_range", "ranges"))?;
    let weights = args.params.weights.as_deref().unwrap_or_default();
    let v = distribution::weighted_range(rng, ranges, weights)
        .ok_or_else(|| SampleError::new("weighted_range has no ranges to draw from"))?;
    Ok(float(args.params, 2, v))
}

/// `generator: "distribution"` picks the sampler from `params.distribution`.
fn sample_distribution(args: &GeneratorArgs<'_>, rng: &mut StdRng) -> Result<Value, SampleError> {
    match args.params.distribution.as_deref() {
        Some("normal" | "gaussian") => sample_normal(args, rng),
        Some("lognormal" | "log_normal") => sample_lognormal(args, rng),
        Some("weighted_categorical" | "categorical") => sample_categorical(args, rng),
        Some("weighted_range") => sample_weighted_range(args, rng),
        Some("uniform") => {
            let (min, max) = (args.params.min.unwrap_or(0.0), args.params.max.unwrap_or(1.0));
            let v = distribution::uniform(rng, min, max);
            bounded_float(args.params, 2, v, min, max)
        }
        Some(other) => Err(SampleError::new(format!(
            "unknown distribution '{}'; expected normal, lognormal, weighted_categorical, weighted_range or uniform",
            other
        ))),
        None => Err(SampleError::missing("distribution", "distribution")),
    }
}

fn distribution_edges(params: &GeneratorParams) -> Vec<Value> {
    match params.distribution.as_deref() {
        Some("weighted_categorical" | "categorical") => categorical_edges(params),
        Some("weighted_range") => range_edges(params),
        _ => bound_edges(params, None, None),
    }
}

fn log_normal_from(
    params: &GeneratorParams,
    rng: &mut StdRng,
    default_median: f64,
    default_min: f64,
    default_max: f64,
) -> Result<Value, SampleError> {
    let median = params.median.unwrap_or(default_median);
    let min = params.min.unwrap_or(default_min);
    let max = params.max.unwrap_or(default_max);
    let v = match params.sigma {
        Some(sigma) => distribution::log_normal_with_sigma(rng, median, sigma, min, max),
        None => distribution::log_normal(rng, median, min, max),
    };
    bounded_float(params, 2, v, min, max)
}

fn static_categorical(
    args: &GeneratorArgs<'_>,
    rng: &mut StdRng,
    table: &'static [(&'static str, f64)],
) -> Result<Value, SampleError> {
    if args.params.values.is_some() {
        return sample_categorical(args, rng);
    }
    let weights: Vec<f64> = table.iter().map(|(_, w)| *w).collect();
    let idx = distribution::weighted_index(rng, &weights).unwrap_or_default();
    Ok(borrowed(table[idx].0))
}

// === Edge cases ===

/// `min` and `max` from params, falling back to the generator's defaults,
/// each moved inward to the generator's precision. Unbounded sides
/// contribute nothing.
fn bound_edges(
    params: &GeneratorParams,
    default_min: Option<f64>,
    default_max: Option<f64>,
) -> Vec<Value> {
    let min = params.min.or(default_min).filter(|v| v.is_finite());
    let max = params.max.or(default_max).filter(|v| v.is_finite());
    let places = params.precision.unwrap_or(2);
    let Some((lo, hi)) = distribution::inward_bounds(
        min.unwrap_or(f64::NEG_INFINITY),
        max.unwrap_or(f64::INFINITY),
        places,
    ) else {
        return Vec::new();
    };
    [min.map(|_| lo), max.map(|_| hi)]
        .into_iter()
        .flatten()
        .map(Value::Float)
        .collect()
}

/// The least likely value(s): every value sharing the smallest weight, or
/// the first and last value when unweighted.
fn categorical_edges(params: &GeneratorParams) -> Vec<Value> {
    let Some(values) = params.values.as_deref().filter(|v| !v.is_empty()) else {
        return Vec::new();
    };
    match params.weights.as_deref().filter(|w| w.len() == values.len()) {
        Some(weights) => {
            let rarest = weights
                .iter()
                .copied()
                .filter(|w| *w > 0.0)
                .fold(f64::INFINITY, f64::min);
            values
                .iter()
                .zip(weights)
                .filter(|(_, w)| **w == rarest)
                .map(|(v, _)| Value::from_json(v))
                .collect()
        }
        None => {
            let mut edges = vec![Value::from_json(&values[0])];
            if values.len() > 1 {
                edges.push(Value::from_json(&values[values.len() - 1]));
            }
            edges
        }
    }
}

fn static_categorical_edges(
    params: &GeneratorParams,
    table: &'static [(&'static str, f64)],
) -> Vec<Value> {
    if params.values.is_some() {
        return categorical_edges(params);
    }
    let rarest = table.iter().map(|(_, w)| *w).fold(f64::INFINITY, f64::min);
    table
        .iter()
        .filter(|(_, w)| *w == rarest)
        .map(|(v, _)| borrowed(*v))
        .collect()
}

/// Lowest lower bound and highest upper bound across all ranges.
fn range_edges(params: &GeneratorParams) -> Vec<Value> {
    let Some(ranges) = params.ranges.as_deref().filter(|r| !r.is_empty()) else {
        return Vec::new();
    };
    let lo = ranges.iter().map(|[lo, _]| *lo).fold(f64::INFINITY, f64::min);
    let hi = ranges
        .iter()
        .map(|[_, hi]| *hi)
        .fold(f64::NEG_INFINITY, f64::max);
    vec![float(params, 2, lo), float(params, 2, hi)]
}

// === Temporal ===

const SECONDS_PER_DAY: i64 = 86_400;

fn day_window(params: &GeneratorParams) -> (i64, i64) {
    let back = params.days_back.unwrap_or(365).max(0);
    let forward = params.days_forward.unwrap_or(0).max(0);
    (-back, forward)
}

fn out_of_range(args: &GeneratorArgs<'_>, offset_days: i64) -> SampleError {
    SampleError::new(format!(
        "{} days from base_time {} is outside the representable calendar",
        offset_days, args.base_time
    ))
}

fn shift_date(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    TimeDelta::try_days(days).and_then(|d| date.checked_add_signed(d))
}

fn shift_timestamp(ts: NaiveDateTime, seconds: i64) -> Option<NaiveDateTime> {
    TimeDelta::try_seconds(seconds).and_then(|d| ts.checked_add_signed(d))
}

fn sample_date(args: &GeneratorArgs<'_>, rng: &mut StdRng) -> Result<Value, SampleError> {
    let (from, to) = day_window(args.params);
    let offset = distribution::uniform_int(rng, from, to);
    shift_date(args.base_time.date(), offset)
        .map(Value::Date)
        .ok_or_else(|| out_of_range(args, offset))
}

fn sample_timestamp(args: &GeneratorArgs<'_>, rng: &mut StdRng) -> Result<Value, SampleError> {
    let (from, to) = day_window(args.params);
    let Some(lo) = from.checked_mul(SECONDS_PER_DAY) else {
        return Err(out_of_range(args, from));
    };
    let Some(hi) = to.checked_mul(SECONDS_PER_DAY) else {
        return Err(out_of_range(args, to));
    };
    let offset = distribution::uniform_int(rng, lo, hi);
    shift_timestamp(args.base_time, offset)
        .map(Value::Timestamp)
        .ok_or_else(|| out_of_range(args, offset / SECONDS_PER_DAY))
}

/// Window ends that land on the calendar; the sampler reports the rest.
fn date_edges(args: &GeneratorArgs<'_>) -> Vec<Value> {
    let (from, to) = day_window(args.params);
    let today = args.base_time.date();
    [from, to]
        .into_iter()
        .filter_map(|days| shift_date(today, days))
        .map(Value::Date)
        .collect()
}

fn timestamp_edges(args: &GeneratorArgs<'_>) -> Vec<Value> {
    let (from, to) = day_window(args.params);
    [from, to]
        .into_iter()
        .filter_map(|days| shift_timestamp(args.base_time, days.checked_mul(SECONDS_PER_DAY)?))
        .map(Value::Timestamp)
        .collect()
}

// === Type-driven defaults ===

/// Produce a syntactically valid value for a column that declares no
/// generator.
pub fn type_default(
    column_type: &ColumnType,
    row_index: usize,
    rng: &mut StdRng,
    base_time: NaiveDateTime,
) -> Value {
    match column_type.data_type {
        DataType::SmallInt => Value::Int(rng.random_range(1..=100)),
        DataType::Integer | DataType::BigInt | DataType::Serial | DataType::BigSerial => {
            Value::Int(rng.random_range(1..=1_000))
        }
        DataType::Numeric | DataType::Float | DataType::Double => {
            let v: f64 = rng.random_range(0.0..1_000.0);
            Value::Float(distribution::round_to(v, column_type.scale.unwrap_or(2)))
        }
        DataType::Uuid => Value::Uuid(random_uuid(rng)),
        DataType::Char | DataType::VarChar => {
            let word: String = Word().fake_with_rng(rng);
            owned(format!("{}_{}", word, row_index + 1))
        }
        DataType::Text => owned(Sentence(4..10).fake_with_rng(rng)),
        DataType::Date => {
            let days_ago = rng.random_range(0..365);
            Value::Date(base_time.date() - TimeDelta::days(days_ago))
        }
        DataType::Timestamp | DataType::TimestampTz => {
            let seconds_ago = rng.random_range(0..365 * 86_400);
            Value::Timestamp(base_time - TimeDelta::seconds(seconds_ago))
        }
        DataType::Time => {
            let hour = rng.random_range(0..24);
            let min = rng.random_range(0..60);
            let sec = rng.random_range(0..60);
            Value::Time(NaiveTime::from_hms_opt(hour, min, sec).unwrap_or_default())
        }
        DataType::Boolean => Value::Bool(rng.random_bool(0.5)),
        DataType::Json | DataType::Jsonb => {
            let keys = ["metadata", "preferences", "flags", "attributes"];
            let key = keys[rng.random_range(0..keys.len())];
            Value::Json(serde_json::json!({
                key: random_alphanumeric(rng, 8),
                "version": rng.random_range(1u32..5u32)
            }))
        }
        DataType::Enum => {
            let values = &column_type.enum_values;
            if values.is_empty() {
                Value::Null
            } else {
                owned(values[rng.random_range(0..values.len())].clone())
            }
        }
    }
}

/// Boundary values of a column's declared type, used when its generator
/// has none of its own.
pub fn type_edge_cases(column_type: &ColumnType) -> Vec<Value> {
    match column_type.family() {
        TypeFamily::Integer => {
            let (min, max) = column_type
                .data_type
                .integer_bounds()
                .unwrap_or((i32::MIN as i64, i32::MAX as i64));
            vec![Value::Int(0), Value::Int(min), Value::Int(max)]
        }
        TypeFamily::Decimal => {
            let scale = column_type.scale.unwrap_or(2);
            let max = match column_type.precision {
                Some(p) if p > scale => {
                    10f64.powi((p - scale) as i32) - 10f64.powi(-(scale as i32))
                }
                _ => 999_999.99,
            };
            vec![
                Value::Float(0.0),
                Value::Float(distribution::round_to(max, scale)),
                Value::Float(distribution::round_to(-max, scale)),
            ]
        }
        TypeFamily::String => {
            if column_type.data_type == DataType::Uuid {
                return vec![Value::Uuid(Uuid::nil()), Value::Uuid(Uuid::from_u128(u128::MAX))];
            }
            let mut edges = vec![borrowed(""), borrowed("O'Brien-Ünïcödé")];
            if let Some(len) = column_type.length {
                edges.push(owned("x".repeat(len as usize)));
            }
            edges
        }
        TypeFamily::DateTime => {
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
            let y2038 = NaiveDate::from_ymd_opt(2038, 1, 19).unwrap_or_default();
            match column_type.data_type {
                DataType::Date => vec![Value::Date(epoch), Value::Date(y2038)],
                DataType::Time => vec![
                    Value::Time(NaiveTime::MIN),
                    Value::Time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default()),
                ],
                _ => vec![
                    Value::Timestamp(epoch.and_time(NaiveTime::MIN)),
                    Value::Timestamp(y2038.and_hms_opt(3, 14, 7).unwrap_or_default()),
                ],
            }
        }
        TypeFamily::Boolean => vec![Value::Bool(true), Value::Bool(false)],
        TypeFamily::Json => vec![
            Value::Json(serde_json::json!({})),
            Value::Json(serde_json::json!([])),
        ],
        TypeFamily::Enum => {
            let values = &column_type.enum_values;
            match (values.first(), values.last()) {
                (Some(first), Some(last)) if first != last => {
                    vec![owned(first.clone()), owned(last.clone())]
                }
                (Some(first), _) => vec![owned(first.clone())],
                _ => Vec::new(),
            }
        }
    }
}

// === Helpers ===

fn float(params: &GeneratorParams, default_places: u32, v: f64) -> Value {
    Value::Float(distribution::round_to(
        v,
        params.precision.unwrap_or(default_places),
    ))
}

/// Round a sample drawn from `[min, max]` to the generator's precision
/// without leaving that range.
fn bounded_float(
    params: &GeneratorParams,
    default_places: u32,
    v: f64,
    min: f64,
    max: f64,
) -> Result<Value, SampleError> {
    let places = params.precision.unwrap_or(default_places);
    distribution::round_within(v, places, min, max)
        .map(Value::Float)
        .ok_or_else(|| {
            SampleError::new(format!(
                "no value with {} decimal places lies within [{}, {}]; raise generator_params.precision",
                places, min, max
            ))
        })
}

fn int_bounds(params: &GeneratorParams, default_min: i64, default_max: i64) -> (i64, i64) {
    let min = params.min.map(|v| v.ceil() as i64).unwrap_or(default_min);
    let max = params.max.map(|v| v.floor() as i64).unwrap_or(default_max);
    if min <= max {
        (min, max)
    } else {
        (max, min)
    }
}

/// A v4 UUID drawn from the row's random source, so it is reproducible.
fn random_uuid(rng: &mut StdRng) -> Uuid {
    uuid::Builder::from_random_bytes(rng.random()).into_uuid()
}

fn random_alphanumeric(rng: &mut impl Rng, len: usize) -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    (0..len)
        .map(|_| CHARS[rng.random_range(0..CHARS.len())] as char)
        .collect()
}
