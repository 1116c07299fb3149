// Benchmarks for the entity post-processing pipeline and term search
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use finterm_core::{
    combine_entities, remove_overlapping_entities, Entity, EntityPostProcessor, FinancialTerm, NerOptions,
    OverlapPolicy, TermIndex, TermIndexConfig, TermTypes, Vector,
};
use rand::prelude::*;

const GROUPS: [&str; 6] = ["ORG", "MONEY", "PERCENT", "PRODUCT", "MISC", "PER"];

fn generate_text(len: usize) -> String {
    "Acme Corp reported $5B revenue, up 12% ".chars().cycle().take(len).collect()
}

fn generate_random_spans(count: usize, text_len: usize, rng: &mut StdRng) -> Vec<Entity> {
    let mut spans: Vec<Entity> = (0..count)
        .map(|_| {
            let start = rng.random_range(0..text_len.saturating_sub(12).max(1));
            let end = start + rng.random_range(1..12);
            let group = GROUPS[rng.random_range(0..GROUPS.len())];
            Entity::new(group, "", start, end, rng.random_range(0.5..1.0))
        })
        .collect();
    spans.sort_by_key(|e| e.start);
    spans
}

fn generate_random_vector(dim: usize, rng: &mut StdRng) -> Vector {
    let data: Vec<f32> = (0..dim).map(|_| rng.random_range(-1.0f32..1.0f32)).collect();
    Vector::new(data)
}

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let mut rng = StdRng::seed_from_u64(7);
    let processor = EntityPostProcessor::new(OverlapPolicy::Compatible);
    let options = NerOptions { combine_financial_entities: true };

    for size in [10, 100, 1000].iter() {
        let text = generate_text(size * 10);
        let spans = generate_random_spans(*size, size * 10, &mut rng);

        group.bench_with_input(BenchmarkId::new("process", size), size, |b, _| {
            b.iter(|| processor.process(black_box(&text), spans.clone(), &options, &TermTypes::all()));
        });
        group.bench_with_input(BenchmarkId::new("combine", size), size, |b, _| {
            b.iter(|| combine_entities(spans.clone(), black_box(&text), true));
        });
        group.bench_with_input(BenchmarkId::new("deoverlap_strict", size), size, |b, _| {
            b.iter(|| remove_overlapping_entities(spans.clone(), OverlapPolicy::Strict));
        });
    }

    group.finish();
}

fn benchmark_term_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("term_search");
    let mut rng = StdRng::seed_from_u64(11);

    for size in [1000, 10000].iter() {
        let index = TermIndex::new(TermIndexConfig {
            name: "bench".to_string(),
            vector_dim: 384,
        });
        let terms: Vec<(FinancialTerm, Vector)> = (0..*size)
            .map(|i| {
                (
                    FinancialTerm::standard(format!("FIN_{:06}", i), format!("term {}", i), "FINTERM"),
                    generate_random_vector(384, &mut rng),
                )
            })
            .collect();
        if index.batch_upsert(terms).is_err() {
            continue;
        }
        let query = generate_random_vector(384, &mut rng);

        group.bench_with_input(BenchmarkId::new("top5", size), size, |b, _| {
            b.iter(|| index.search(black_box(&query), 5));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_pipeline, benchmark_term_search);
criterion_main!(benches);
