//! Coverage-threshold boolean retrieval.

use super::{sort_desc, Hit};
use crate::index::{DocId, InvertedIndex, Term};
use std::collections::{BTreeMap, HashSet};

fn distinct(terms: &[Term]) -> Vec<&str> {
    let mut seen = HashSet::new();
    terms.iter().map(String::as_str).filter(|t| seen.insert(*t)).collect()
}

/// Count, per document, how many distinct query terms it contains.
fn coverage(index: &InvertedIndex, terms: &[Term]) -> BTreeMap<DocId, usize> {
    let mut counts: BTreeMap<DocId, usize> = BTreeMap::new();
    for term in distinct(terms) {
        if let Some(plist) = index.postings(term) {
            for doc in plist.keys() {
                *counts.entry(doc.clone()).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Documents matching at least `min_match` distinct query terms (and always at
/// least one), in ascending id order, capped at `limit`.
pub fn boolean_search(index: &InvertedIndex, terms: &[Term], min_match: usize, limit: usize) -> Vec<DocId> {
    coverage(index, terms)
        .into_iter()
        .filter(|(_, n)| *n >= min_match.max(1))
        .map(|(doc, _)| doc)
        .take(limit)
        .collect()
}

/// Order matched documents by summed raw tf over the query terms, capped at `limit`.
pub fn rank_by_tf(index: &InvertedIndex, terms: &[Term], docs: &[DocId], limit: usize) -> Vec<Hit> {
    let terms = distinct(terms);
    let mut hits: Vec<Hit> = docs
        .iter()
        .map(|doc| {
            let score: u32 = terms.iter().map(|t| index.tf(t, doc)).sum();
            Hit::new(doc.clone(), score as f64)
        })
        .collect();
    sort_desc(&mut hits);
    hits.truncate(limit);
    hits
}

/// Order matched documents by the number of distinct query terms they contain.
pub fn rank_by_coverage(index: &InvertedIndex, terms: &[Term], docs: &[DocId]) -> Vec<Hit> {
    let terms = distinct(terms);
    let mut hits: Vec<Hit> = docs
        .iter()
        .map(|doc| {
            let n = terms.iter().filter(|t| index.posting(t, doc).is_some()).count();
            Hit::new(doc.clone(), n as f64)
        })
        .collect();
    sort_desc(&mut hits);
    hits
}
