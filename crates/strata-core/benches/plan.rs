//! Diff and plan generation benchmarks.
//!
//! Measures planning cost on wide schemas where most tables are unchanged.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use strata_core::catalog::{ColumnDef, IndexDef, SchemaVersion, StorageType, TableDef};
use strata_core::migration::{Generator, MigrationPlan, SchemaDiff};

fn wide_table(index: usize, columns: usize) -> TableDef {
    let mut table = TableDef::new(format!("Table{}", index)).with_column(ColumnDef::id("id"));
    for c in 0..columns {
        table = table.with_column(ColumnDef::new(format!("col{}", c), StorageType::Text));
    }
    table.with_index(IndexDef::new(format!("IDX_TABLE{}_COL0", index), "col0"))
}

fn schema(version: u32, tables: usize) -> SchemaVersion {
    let mut schema = SchemaVersion::new(version, "bench");
    for t in 0..tables {
        let mut table = wide_table(t, 20);
        if version > 1 && t % 10 == 0 {
            table = table.with_column(ColumnDef::new("added", StorageType::Integer));
        }
        schema = schema.with_table(table);
    }
    schema
}

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan/diff");

    for tables in [10, 100, 500] {
        let from = schema(1, tables);
        let to = schema(2, tables);
        group.bench_with_input(BenchmarkId::new("compute", tables), &tables, |b, _| {
            b.iter(|| black_box(SchemaDiff::compute(&from, &to, None).change_count()));
        });
        group.bench_with_input(BenchmarkId::new("build", tables), &tables, |b, _| {
            b.iter(|| black_box(MigrationPlan::build(&from, &to, None).unwrap()));
        });
    }

    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan/generate");

    for versions in [2u32, 10] {
        let schemas: Vec<_> = (1..=versions).map(|v| schema(v, 100)).collect();
        group.bench_with_input(BenchmarkId::new("history", versions), &versions, |b, _| {
            b.iter(|| {
                let generated = Generator::default()
                    .with_schemas(schemas.clone())
                    .generate()
                    .unwrap();
                black_box(generated.chain.len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_diff, bench_generate);
criterion_main!(benches);
