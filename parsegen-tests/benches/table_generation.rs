use criterion::{criterion_group, criterion_main, Criterion};
use parsegen_core::prelude::v1::*;
use parsegen_core::{generate_table_from_production_set, GeneratedTable, GeneratorKind};

fn statement_language_construction(c: &mut Criterion) {
    c.bench_function("statement language construction", |b| {
        b.iter(|| {
            let language = Language::statements(ParserConfig::default()).unwrap();

            assert_eq!(language.lr_table().states, 58)
        });
    });
}

fn table_generation_from_known_grammar(c: &mut Criterion) {
    let mut group = c.benchmark_group("table generation");

    group.bench_function("ll(1)", |b| {
        b.iter(|| {
            let table = generate_table_from_production_set(GeneratorKind::Ll1, STATEMENT_GRAMMAR)
                .unwrap();

            assert!(matches!(table, GeneratedTable::Ll1(table) if table.len() == 52))
        });
    });

    group.bench_function("slr(1)", |b| {
        b.iter(|| {
            let table = generate_table_from_production_set(GeneratorKind::Slr1, STATEMENT_GRAMMAR)
                .unwrap();

            assert!(matches!(table, GeneratedTable::Slr1(table) if table.states == 58))
        });
    });
}

criterion_group!(
    benches,
    statement_language_construction,
    table_generation_from_known_grammar
);
criterion_main!(benches);
