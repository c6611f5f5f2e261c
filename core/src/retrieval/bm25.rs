//! Okapi BM25 ranking over the stored (tf, idf) postings.

use super::{sort_desc, Hit};
use crate::config::Bm25Params;
use crate::index::InvertedIndex;
use crate::query::Query;

/// Contribution of one term to a document's score.
pub fn term_score(tf: f64, idf: f64, doc_len: f64, avg_doc_len: f64, params: Bm25Params) -> f64 {
    if tf <= 0.0 || avg_doc_len <= 0.0 {
        return 0.0;
    }
    let Bm25Params { k1, b } = params;
    let norm = tf + k1 * (1.0 - b + b * doc_len / avg_doc_len);
    idf * tf * (k1 + 1.0) / norm
}

/// BM25 score of one document. Query terms missing from the index or from the
/// document contribute nothing; repeated query terms count once per repetition.
pub fn score_document(
    index: &InvertedIndex,
    query: &Query,
    doc: &str,
    doc_len: usize,
    avg_doc_len: f64,
    params: Bm25Params,
) -> f64 {
    query
        .terms()
        .iter()
        .filter_map(|t| index.posting(t, doc).map(|p| (query.count(t), p)))
        .map(|(n, p)| n as f64 * term_score(p.tf as f64, p.idf, doc_len as f64, avg_doc_len, params))
        .sum()
}

/// Score every candidate. The average length is taken over the candidates
/// supplied, not the whole corpus.
pub fn rank_documents(index: &InvertedIndex, query: &Query, docs: &[(&str, usize)], params: Bm25Params) -> Vec<Hit> {
    if docs.is_empty() || !query.terms().iter().any(|t| index.contains_term(t)) {
        return Vec::new();
    }
    let avg_doc_len = docs.iter().map(|(_, len)| *len as f64).sum::<f64>() / docs.len() as f64;
    let mut hits: Vec<Hit> = docs
        .iter()
        .map(|(doc, len)| Hit::new(*doc, score_document(index, query, doc, *len, avg_doc_len, params)))
        .collect();
    sort_desc(&mut hits);
    hits
}

/// BM25 ranking truncated to the `top_k` best documents.
pub fn evidence_curator(
    index: &InvertedIndex,
    query: &Query,
    docs: &[(&str, usize)],
    params: Bm25Params,
    top_k: usize,
) -> Vec<Hit> {
    let mut hits = rank_documents(index, query, docs, params);
    hits.truncate(top_k);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;
    use crate::index::build_index;
    use std::collections::HashMap;

    fn index(docs: &[(&str, &str)]) -> InvertedIndex {
        let docs: HashMap<String, Vec<String>> = docs
            .iter()
            .map(|(id, t)| (id.to_string(), t.split_whitespace().map(String::from).collect()))
            .collect();
        build_index(&docs, &IndexConfig { prune_top: 0, ..IndexConfig::default() }).unwrap()
    }

    #[test]
    fn matches_reference_formula() {
        let p = Bm25Params::default();
        // tf=2, idf=1, doc_len == avg: 2 * 2.5 / (2 + 1.5)
        assert!((term_score(2.0, 1.0, 10.0, 10.0, p) - 5.0 / 3.5).abs() < 1e-12);
    }

    #[test]
    fn zero_average_length_scores_zero() {
        assert_eq!(term_score(3.0, 1.0, 0.0, 0.0, Bm25Params::default()), 0.0);
    }

    #[test]
    fn higher_tf_ranks_first() {
        let idx = index(&[("d1", "rust rust rust"), ("d2", "rust code"), ("d3", "python")]);
        let hits = rank_documents(&idx, &Query::from_terms(["rust"]), &idx.documents(), Bm25Params::default());
        assert_eq!(hits[0].doc_id, "d1");
        assert_eq!(hits[1].doc_id, "d2");
        assert_eq!(hits[2], Hit::new("d3", 0.0));
    }

    #[test]
    fn curator_truncates() {
        let idx = index(&[("d1", "a"), ("d2", "a b"), ("d3", "a c"), ("d4", "d")]);
        let hits = evidence_curator(&idx, &Query::from_terms(["a"]), &idx.documents(), Bm25Params::default(), 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].doc_id, "d1");
    }

    #[test]
    fn empty_query_returns_nothing() {
        let idx = index(&[("d1", "a")]);
        assert!(rank_documents(&idx, &Query::default(), &idx.documents(), Bm25Params::default()).is_empty());
    }
}
