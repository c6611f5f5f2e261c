use criterion::{criterion_group, criterion_main, Criterion};
use medlit_core::index::index_corpus;
use medlit_core::retrieval::{rank, Strategy};
use medlit_core::tokenizer::tokenize;
use medlit_core::{IndexConfig, Normalizer, Query, RetrievalConfig};
use std::collections::HashMap;

const ABSTRACT: &str = "Alpelisib plus fulvestrant improved progression-free survival in patients \
with PIK3CA-mutated, hormone receptor-positive, HER2-negative advanced breast cancer who had \
received prior endocrine therapy. Hyperglycemia and rash were the most frequent adverse events.";

fn corpus() -> HashMap<String, String> {
    (0..200)
        .map(|i| (format!("doc{i:04}.pdf"), format!("{ABSTRACT} cohort{} arm{}", i % 17, i % 5)))
        .collect()
}

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_abstract", |b| b.iter(|| tokenize(ABSTRACT)));
}

fn bench_rank(c: &mut Criterion) {
    let index = index_corpus(&corpus(), &IndexConfig { prune_top: 5, normalizer: Normalizer::Lemma }).unwrap();
    let query = Query::parse("alpelisib fulvestrant pik3ca cohort3 arm2", Normalizer::Lemma);
    let config = RetrievalConfig::default();
    for strategy in [Strategy::Boolean, Strategy::Vector, Strategy::Bm25] {
        c.bench_function(&format!("rank_{strategy:?}"), |b| b.iter(|| rank(&index, &query, strategy, &config)));
    }
}

criterion_group!(benches, bench_tokenize, bench_rank);
criterion_main!(benches);
