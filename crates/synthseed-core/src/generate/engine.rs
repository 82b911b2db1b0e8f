use std::ops::Range;

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{GenerationError, Result};
use crate::generate::coerce::coerce;
use crate::generate::dataset::{Dataset, Row, TableData};
use crate::generate::keys::{KeyPoolError, KeyTracker};
use crate::generate::plan::*;
use crate::generate::providers::type_default;
use crate::generate::registry::{GeneratorArgs, GeneratorRegistry};
use crate::generate::unique::UniqueTracker;
use crate::generate::value::Value;
use crate::schema::types::ValidatedSchema;

/// Rows built between cancellation checks and progress reports.
const CHUNK_SIZE: usize = 1024;

/// Progress callback: `(table, rows generated so far, total rows)`.
pub type ProgressFn<'a> = &'a dyn Fn(&str, usize, usize);

/// Plan and execute one generation run.
///
/// Returns either a complete Dataset or an error; rows generated before a
/// failure are discarded.
pub fn generate(
    schema: &ValidatedSchema,
    registry: &GeneratorRegistry,
    options: &GenerateOptions,
    cancel: &CancellationToken,
    progress: Option<ProgressFn<'_>>,
) -> Result<Dataset> {
    let plan = GenerationPlan::build(schema, registry, options)?;
    execute_plan(&plan, cancel, progress)
}

/// Execute a generation plan and produce all the data.
///
/// Tables run strictly in plan order. Within a table, rows are produced in
/// chunks: candidate rows are built in parallel (each from its own RNG, so
/// the worker count never changes the output), then committed in row order
/// by this thread, which owns the unique seen-sets and the key pools.
pub fn execute_plan(
    plan: &GenerationPlan,
    cancel: &CancellationToken,
    progress: Option<ProgressFn<'_>>,
) -> Result<Dataset> {
    let mut keys = KeyTracker::new();
    let mut unique = UniqueTracker::new(plan.max_unique_retries);
    let mut dataset = Dataset::default();

    let total_rows = plan.total_rows();
    let mut rows_generated = 0usize;

    for table in &plan.tables {
        if cancel.is_cancelled() {
            return Err(cancelled(table));
        }

        debug!("Generating '{}' ({} rows)", table.name, table.row_count);
        keys.begin(&table.name, table.row_count)
            .map_err(|e| pool_error(table, e))?;
        for column in table.columns.iter().filter(|c| c.unique) {
            unique.register(&table.name, &column.name);
        }

        let mut data = TableData::new(table.columns.iter().map(|c| c.name.clone()).collect());
        data.rows
            .try_reserve_exact(table.row_count)
            .map_err(|_| GenerationError::TooManyRows {
                table: table.name.clone(),
                rows: table.row_count,
            })?;

        let mut start = 0;
        while start < table.row_count {
            if cancel.is_cancelled() {
                return Err(cancelled(table));
            }
            let end = (start + CHUNK_SIZE).min(table.row_count);

            let candidates = build_chunk(plan, table, start..end, &keys)?;
            for (offset, candidate) in candidates.into_iter().enumerate() {
                let row = commit_row(plan, table, start + offset, candidate, &mut keys, &mut unique)?;
                data.rows.push(row);
            }

            rows_generated += end - start;
            if let Some(cb) = progress {
                cb(&table.name, rows_generated, total_rows);
            }
            start = end;
        }

        keys.freeze(&table.name);
        info!(
            "Generated {} rows for '{}' ({} keys recorded)",
            data.rows.len(),
            table.name,
            keys.pool_size(&table.name)
        );
        dataset.tables.insert(table.name.clone(), data);
    }

    Ok(dataset)
}

/// A row before unique checks, with the RNG that produced it so any
/// resampling continues the same stream.
struct Candidate {
    values: Vec<Value>,
    rng: StdRng,
}

fn build_chunk(
    plan: &GenerationPlan,
    table: &TablePlan,
    rows: Range<usize>,
    keys: &KeyTracker,
) -> Result<Vec<Candidate>> {
    let workers = plan.workers.min(rows.len()).max(1);
    if workers == 1 {
        return rows
            .map(|row_index| build_candidate(plan, table, row_index, keys))
            .collect();
    }

    let per_worker = rows.len().div_ceil(workers);
    std::thread::scope(|scope| {
        let handles: Vec<_> = rows
            .clone()
            .step_by(per_worker)
            .map(|lo| {
                let hi = (lo + per_worker).min(rows.end);
                scope.spawn(move || {
                    (lo..hi)
                        .map(|row_index| build_candidate(plan, table, row_index, keys))
                        .collect::<Result<Vec<_>>>()
                })
            })
            .collect();

        let mut candidates = Vec::with_capacity(rows.len());
        for handle in handles {
            match handle.join() {
                Ok(part) => candidates.extend(part?),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        Ok(candidates)
    })
}

fn build_candidate(
    plan: &GenerationPlan,
    table: &TablePlan,
    row_index: usize,
    keys: &KeyTracker,
) -> Result<Candidate> {
    let mut rng = StdRng::seed_from_u64(row_seed(plan.seed, table.position, row_index));
    let values = table
        .columns
        .iter()
        .map(|column| resolve_value(table, column, row_index, &mut rng, keys, plan.base_time))
        .collect::<Result<Vec<_>>>()?;
    Ok(Candidate { values, rng })
}

/// Apply unique checks and record the primary key. Runs on the writer
/// thread, in row order.
fn commit_row(
    plan: &GenerationPlan,
    table: &TablePlan,
    row_index: usize,
    mut candidate: Candidate,
    keys: &mut KeyTracker,
    unique: &mut UniqueTracker,
) -> Result<Row> {
    for (i, column) in table.columns.iter().enumerate() {
        if !column.unique {
            continue;
        }
        let mut attempts = 0;
        while !unique.try_insert(&table.name, &column.name, &candidate.values[i]) {
            if attempts == unique.max_retries {
                return Err(GenerationError::UniqueExhausted {
                    table: table.name.clone(),
                    column: column.name.clone(),
                    row_index,
                    max_retries: unique.max_retries,
                }
                .into());
            }
            attempts += 1;
            debug!(
                "Unique collision on {}.{} at row {}, resampling (attempt {}/{})",
                table.name, column.name, row_index, attempts, unique.max_retries
            );
            candidate.values[i] = resample(
                table,
                column,
                row_index + attempts,
                &mut candidate.rng,
                keys,
                plan.base_time,
            )?;
        }
    }

    keys.record(&table.name, candidate.values[table.primary_key].clone())
        .map_err(|e| pool_error(table, e))?;

    Ok(table
        .columns
        .iter()
        .map(|c| c.name.clone())
        .zip(candidate.values)
        .collect())
}

/// Resolve one column of one row: keys first, then null injection, then
/// edge-case injection, then the column's generator.
fn resolve_value(
    table: &TablePlan,
    column: &ColumnPlan,
    row_index: usize,
    rng: &mut StdRng,
    keys: &KeyTracker,
    base_time: NaiveDateTime,
) -> Result<Value> {
    match &column.strategy {
        ColumnStrategy::AutoIncrement => return Ok(Value::Int(row_index as i64 + 1)),
        ColumnStrategy::ForeignKey { .. } => return reference(table, column, rng, keys),
        ColumnStrategy::Generator { .. } | ColumnStrategy::TypeDefault => {}
    }

    if draw(rng, column.null_probability) {
        return Ok(Value::Null);
    }
    if !column.edge_values.is_empty() && draw(rng, column.edge_case_probability) {
        let pick = rng.random_range(0..column.edge_values.len());
        return Ok(column.edge_values[pick].clone());
    }

    sample(table, column, row_index, rng, base_time)
}

/// Draw a replacement for a colliding unique value. No injection: a
/// resample always comes from the column's own generator or key pool.
fn resample(
    table: &TablePlan,
    column: &ColumnPlan,
    row_index: usize,
    rng: &mut StdRng,
    keys: &KeyTracker,
    base_time: NaiveDateTime,
) -> Result<Value> {
    match &column.strategy {
        ColumnStrategy::AutoIncrement => Ok(Value::Int(row_index as i64 + 1)),
        ColumnStrategy::ForeignKey { .. } => reference(table, column, rng, keys),
        ColumnStrategy::Generator { .. } | ColumnStrategy::TypeDefault => {
            sample(table, column, row_index, rng, base_time)
        }
    }
}

fn sample(
    table: &TablePlan,
    column: &ColumnPlan,
    row_index: usize,
    rng: &mut StdRng,
    base_time: NaiveDateTime,
) -> Result<Value> {
    let raw = match &column.strategy {
        ColumnStrategy::Generator {
            name,
            params,
            entry,
        } => {
            let args = GeneratorArgs {
                params,
                row_index,
                base_time,
            };
            entry
                .sample(&args, rng)
                .map_err(|e| GenerationError::Generator {
                    table: table.name.clone(),
                    column: column.name.clone(),
                    generator: name.clone(),
                    message: e.to_string(),
                })?
        }
        _ => type_default(&column.column_type, row_index, rng, base_time),
    };

    match coerce(raw, &column.column_type) {
        Ok(value) => Ok(column.clamp_to_bounds(value)),
        Err(unfit) => Err(GenerationError::Generator {
            table: table.name.clone(),
            column: column.name.clone(),
            generator: column.strategy.label().to_string(),
            message: unfit_message(&unfit, &column.column_type),
        }
        .into()),
    }
}

fn reference(
    table: &TablePlan,
    column: &ColumnPlan,
    rng: &mut StdRng,
    keys: &KeyTracker,
) -> Result<Value> {
    let ColumnStrategy::ForeignKey {
        table: parent,
        column: parent_column,
    } = &column.strategy
    else {
        return Ok(Value::Null);
    };

    keys.sample(parent, rng).map_err(|err| match err {
        KeyPoolError::Empty { .. } => GenerationError::EmptyKeyPool {
            table: table.name.clone(),
            column: column.name.clone(),
            referenced_table: parent.clone(),
            referenced_column: parent_column.clone(),
        }
        .into(),
        other => pool_error(table, other),
    })
}

fn draw(rng: &mut StdRng, probability: f64) -> bool {
    probability > 0.0 && rng.random_bool(probability.min(1.0))
}

fn cancelled(table: &TablePlan) -> crate::error::SynthSeedError {
    info!("Generation cancelled before completing '{}'", table.name);
    GenerationError::Cancelled {
        table: Some(table.name.clone()),
    }
    .into()
}

fn pool_error(table: &TablePlan, err: KeyPoolError) -> crate::error::SynthSeedError {
    match err {
        KeyPoolError::Frozen { table } => GenerationError::PoolFrozen { table }.into(),
        KeyPoolError::NotFrozen { table } => GenerationError::PoolIncomplete { table }.into(),
        KeyPoolError::Capacity { table, rows } => GenerationError::TooManyRows { table, rows }.into(),
        KeyPoolError::Empty { table: parent } => GenerationError::EmptyKeyPool {
            table: table.name.clone(),
            column: String::new(),
            referenced_table: parent,
            referenced_column: String::new(),
        }
        .into(),
    }
}

/// Seed for one row's RNG. Depends only on the run seed and the row's
/// coordinates, never on scheduling.
fn row_seed(seed: u64, table_position: usize, row_index: usize) -> u64 {
    splitmix64(splitmix64(seed ^ splitmix64(table_position as u64)) ^ row_index as u64)
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
