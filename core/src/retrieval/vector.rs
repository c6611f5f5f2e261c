//! TF-IDF vector space retrieval with cosine similarity.

use super::{sort_desc, Hit};
use crate::config::VectorIdf;
use crate::index::InvertedIndex;
use crate::query::Query;
use std::collections::HashMap;

/// Cosine of two equal-length vectors; 0.0 when either norm is zero.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}

fn sparse_cosine(a: &HashMap<&str, f64>, b: &HashMap<&str, f64>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small.iter().filter_map(|(t, x)| large.get(t).map(|y| x * y)).sum();
    let na = a.values().map(|x| x * x).sum::<f64>().sqrt();
    let nb = b.values().map(|x| x * x).sum::<f64>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}

fn term_idf(index: &InvertedIndex, term: &str, mode: VectorIdf) -> f64 {
    match mode {
        VectorIdf::Term => index.idf(term).unwrap_or(0.0),
        VectorIdf::PostingMean => index.mean_posting_idf(term),
    }
}

/// Query coordinates: occurrence count in the query times the term's idf.
pub fn query_vector(index: &InvertedIndex, query: &Query, terms: &[&str], mode: VectorIdf) -> Vec<f64> {
    terms.iter().map(|t| query.count(t) as f64 * term_idf(index, t, mode)).collect()
}

/// Document coordinates: stored tf times the term's idf.
pub fn doc_vector(index: &InvertedIndex, doc: &str, terms: &[&str], mode: VectorIdf) -> Vec<f64> {
    terms.iter().map(|t| index.tf(t, doc) as f64 * term_idf(index, t, mode)).collect()
}

/// Rank candidate documents by cosine similarity to the query over the
/// vocabulary shared by the index and the query. No truncation.
pub fn rank_documents(index: &InvertedIndex, query: &Query, docs: &[(&str, usize)], mode: VectorIdf) -> Vec<Hit> {
    let terms: Vec<&str> = query
        .terms()
        .iter()
        .map(String::as_str)
        .filter(|t| index.contains_term(t))
        .collect();
    if terms.is_empty() {
        return Vec::new();
    }
    let q = query_vector(index, query, &terms, mode);
    let mut hits: Vec<Hit> = docs
        .iter()
        .map(|(doc, _)| Hit::new(*doc, cosine_similarity(&q, &doc_vector(index, doc, &terms, mode))))
        .collect();
    sort_desc(&mut hits);
    hits
}

/// Sparse TF-IDF vector of a document over the full retained vocabulary.
pub fn content_vector<'a>(index: &'a InvertedIndex, doc: &str) -> HashMap<&'a str, f64> {
    index
        .all_postings()
        .iter()
        .filter_map(|(t, plist)| plist.get(doc).map(|p| (t.as_str(), p.tf as f64 * p.idf)))
        .collect()
}

/// Cosine similarity between two documents' content vectors.
pub fn content_similarity(index: &InvertedIndex, a: &str, b: &str) -> f64 {
    sparse_cosine(&content_vector(index, a), &content_vector(index, b))
}
