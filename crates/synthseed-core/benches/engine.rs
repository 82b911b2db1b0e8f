//! Benchmarks for the generation engine, the core hot path.
//!
//! Measures rows-per-second throughput for `execute_plan` across table
//! sizes, worker counts and parent/child ratios.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio_util::sync::CancellationToken;

use synthseed_core::generate::{execute_plan, GenerateOptions, GenerationPlan, GeneratorRegistry};
use synthseed_core::schema::ValidatedSchema;
use synthseed_testutil as fixtures;

fn wide_table(rows: usize) -> ValidatedSchema {
    fixtures::validated(&fixtures::raw_schema_from_value(
        fixtures::wide_table_document(rows),
    ))
}

fn plan(schema: &ValidatedSchema, options: &GenerateOptions) -> GenerationPlan {
    GenerationPlan::build(schema, &GeneratorRegistry::with_builtins(), options).unwrap()
}

fn bench_single_table_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/single_table");
    let cancel = CancellationToken::new();

    for row_count in [100, 1000, 10_000] {
        let plan = plan(&wide_table(row_count), &GenerateOptions::with_seed(42));
        group.throughput(Throughput::Elements(row_count as u64));
        group.bench_with_input(BenchmarkId::new("rows", row_count), &plan, |b, plan| {
            b.iter(|| execute_plan(plan, &cancel, None).unwrap());
        });
    }
    group.finish();
}

fn bench_workers(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/workers");
    let schema = wide_table(20_000);
    let cancel = CancellationToken::new();

    for workers in [1, 2, 4, 8] {
        let mut options = GenerateOptions::with_seed(42);
        options.workers = workers;
        let plan = plan(&schema, &options);

        group.throughput(Throughput::Elements(20_000));
        group.bench_with_input(BenchmarkId::new("workers", workers), &plan, |b, plan| {
            b.iter(|| execute_plan(plan, &cancel, None).unwrap());
        });
    }
    group.finish();
}

fn bench_fk_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/foreign_keys");
    let schema = fixtures::borrowers_loans();
    let cancel = CancellationToken::new();

    // 250 borrowers with varying loan counts
    for loan_count in [1000, 5000, 20_000] {
        let mut options = GenerateOptions::with_seed(42);
        options.overrides.insert("loans".to_string(), loan_count);
        let plan = plan(&schema, &options);

        group.throughput(Throughput::Elements(plan.total_rows() as u64));
        group.bench_with_input(BenchmarkId::new("loans", loan_count), &plan, |b, plan| {
            b.iter(|| execute_plan(plan, &cancel, None).unwrap());
        });
    }
    group.finish();
}

fn bench_fixture_schemas(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/fixtures");
    group.sample_size(10);
    let cancel = CancellationToken::new();

    for (name, schema) in [
        ("lending", fixtures::lending_schema()),
        ("retail", fixtures::retail_schema()),
        ("healthcare", fixtures::healthcare_schema()),
    ] {
        let plan = plan(&schema, &GenerateOptions::with_seed(42));
        group.throughput(Throughput::Elements(plan.total_rows() as u64));
        group.bench_with_input(BenchmarkId::new("schema", name), &plan, |b, plan| {
            b.iter(|| execute_plan(plan, &cancel, None).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_single_table_generation,
    bench_workers,
    bench_fk_generation,
    bench_fixture_schemas
);
criterion_main!(benches);
