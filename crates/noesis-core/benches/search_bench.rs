//! Benchmarks for the hybrid scoring and vector-index search paths
//! (spec §4.6, §4.8) — where the approximate index switches in matters most.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use noesis_core::embeddings::{cosine_similarity, EmbeddingProvider, HashingEmbedder};
use noesis_core::scoring::{bm25_scores, rank, tokenize, CandidateInput, ScoreWeights};
use noesis_core::store::{VectorIndex, VectorIndexConfig};

fn sample_vectors(embedder: &HashingEmbedder, count: usize) -> Vec<(u32, Vec<f32>)> {
    (0..count).map(|i| (i as u32, embedder.embed(&format!("document body number {i} about retrieval")).unwrap())).collect()
}

fn bench_vector_index_search(c: &mut Criterion) {
    let embedder = HashingEmbedder::default();
    let query = embedder.embed("retrieval document").unwrap();

    let mut group = c.benchmark_group("vector_index_search");
    for &size in &[64usize, 256, 2_000] {
        let entries = sample_vectors(&embedder, size);
        let mut index = VectorIndex::new(VectorIndexConfig::default());
        index.build(entries);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(index.search(&query, 10, |_| true)));
        });
    }
    group.finish();
}

fn bench_hybrid_rank(c: &mut Criterion) {
    let embedder = HashingEmbedder::default();
    let query_tokens = tokenize("retrieval document search");
    let query_vector = embedder.embed("retrieval document search").unwrap();

    c.bench_function("hybrid_rank_500_candidates", |b| {
        b.iter(|| {
            let corpus: Vec<Vec<String>> = (0..500).map(|i| tokenize(&format!("document body {i} about retrieval and search"))).collect();
            let bm25 = bm25_scores(&query_tokens, &corpus);
            let candidates: Vec<CandidateInput> = (0..500)
                .map(|i| CandidateInput {
                    id: i as u32,
                    vector_score: cosine_similarity(&query_vector, &embedder.embed(&format!("document body {i}")).unwrap()),
                    bm25_score: bm25[i],
                    gamma_score: 0.0,
                    delta_score: 0.0,
                    tie_key: i.to_string(),
                })
                .collect();
            black_box(rank(ScoreWeights::BROAD_CHUNK_SEARCH, candidates));
        });
    });
}

criterion_group!(benches, bench_vector_index_search, bench_hybrid_rank);
criterion_main!(benches);
