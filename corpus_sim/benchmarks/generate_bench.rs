use corpus_sim::{generate, CorpusAnalytics, GeneratorConfig, TaxonomyCatalog};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_generate(c: &mut Criterion) {
    let catalog = TaxonomyCatalog::builtin();
    let mut group = c.benchmark_group("generate");

    for total in [1_000u32, 5_000, 20_847] {
        group.bench_with_input(BenchmarkId::new("records", total), &total, |b, &total| {
            let config = GeneratorConfig {
                total_records: total,
                seed: 0xBE7C,
                ..GeneratorConfig::default()
            };
            b.iter(|| generate(catalog, &config).expect("generation"));
        });
    }

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let catalog = TaxonomyCatalog::builtin();
    let config = GeneratorConfig {
        total_records: 20_847,
        seed: 0xBE7C,
        ..GeneratorConfig::default()
    };
    let records = generate(catalog, &config).expect("generation");

    let mut group = c.benchmark_group("aggregate");
    group.bench_function("analytics_build", |b| {
        b.iter(|| CorpusAnalytics::build(catalog, &records.records));
    });
    let analytics = CorpusAnalytics::build(catalog, &records.records);
    group.bench_function("timeline_10y", |b| {
        b.iter(|| analytics.timeline(10));
    });
    group.bench_function("correlation_matrix", |b| {
        b.iter(|| analytics.correlation_matrix());
    });
    group.bench_function("flow_graph", |b| {
        b.iter(|| analytics.flow_graph());
    });
    group.finish();
}

criterion_group!(corpus_benches, bench_generate, bench_aggregate);
criterion_main!(corpus_benches);
