use std::collections::HashMap;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pgx_interpret::{
    AnalysisPipeline, DiplotypePhenotypeTable, EngineConfig, Gene, MarkerRules,
    RecommendationComposer, SampleBatch, SampleRow, diplotype,
};
use rayon::ThreadPoolBuilder;

const MARKERS: [&str; 6] = [
    "DPYD_2A_rs3918290",
    "UGT1A1_28_rs8175347",
    "CYP2D6_10_4_rs1",
    "CYP2D6_10_rs1065852",
    "CYP2D6_4_rs3892097",
    "CYP2D6_41_rs28371725",
];

fn config() -> EngineConfig {
    let rules = MarkerRules::new(
        MARKERS
            .iter()
            .zip(["*2A", "*28", "*10*4", "*10", "*4", "*41"])
            .map(|(marker, allele)| {
                (
                    marker.to_string(),
                    HashMap::from([("T".to_string(), allele.to_string())]),
                )
            })
            .collect(),
    );
    let table = DiplotypePhenotypeTable::from_rows([
        ("*1/*1", "Normal Metabolizer"),
        ("*1/*4", "Intermediate Metabolizer"),
        ("*4/*4", "Poor Metabolizer"),
        ("*1/*41", "Normal Metabolizer"),
        ("*4/*41", "Intermediate Metabolizer"),
    ]);
    EngineConfig::from_parts(rules, table)
}

fn batch(samples: usize) -> SampleBatch {
    let calls = ["C/C", "C/T", "T/T"];
    let rows = (0..samples)
        .map(|i| SampleRow {
            id: format!("S{i:06}"),
            cells: (0..MARKERS.len())
                .map(|m| Some(calls[(i + m) % calls.len()].to_string()))
                .collect(),
        })
        .collect();
    SampleBatch::new(MARKERS.iter().map(|m| m.to_string()).collect(), rows)
}

fn bench_resolution(c: &mut Criterion) {
    let pools: [&[&str]; 3] = [
        &["*1", "*2A"],
        &["*10*4", "*10", "*4", "*41"],
        &["*10*4", "*10*4", "*10", "*10", "*4", "*1"],
    ];
    c.bench_function("resolve_cyp2d6_pools", |b| {
        b.iter(|| {
            for pool in &pools {
                black_box(diplotype::resolve(Gene::Cyp2d6, pool.iter().copied()));
            }
        })
    });
}

fn bench_recommendations(c: &mut Criterion) {
    let composer = RecommendationComposer::default();
    c.bench_function("compose_recommendations", |b| {
        b.iter(|| {
            for gene in Gene::ALL {
                black_box(composer.recommend(gene, pgx_interpret::PhenotypeLabel::Poor));
            }
        })
    });
}

fn bench_parallel_vs_sequential(c: &mut Criterion) {
    let pipeline = AnalysisPipeline::new(config());
    let sequential_pool = ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    let parallel_pool = ThreadPoolBuilder::new().build().unwrap();

    let mut group = c.benchmark_group("batch");
    for samples in [1_000usize, 10_000] {
        let batch = batch(samples);
        group.bench_with_input(BenchmarkId::new("sequential", samples), &batch, |b, batch| {
            b.iter(|| sequential_pool.install(|| black_box(pipeline.run(batch))))
        });
        group.bench_with_input(BenchmarkId::new("parallel", samples), &batch, |b, batch| {
            b.iter(|| parallel_pool.install(|| black_box(pipeline.run(batch))))
        });
    }
    group.finish();
}

criterion_group!(
    pipeline_benches,
    bench_resolution,
    bench_recommendations,
    bench_parallel_vs_sequential
);
criterion_main!(pipeline_benches);
