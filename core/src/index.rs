use crate::config::{IndexConfig, Normalizer};
use crate::error::{Error, Result};
use crate::tokenizer::tokenize_with;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub type Term = String;
pub type DocId = String;

/// One (term, document) entry. Persisted as a two-element `[tf, idf]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(u32, f64)", into = "(u32, f64)")]
pub struct Posting {
    pub tf: u32,
    pub idf: f64, // denormalized copy of the term's idf
}

impl From<(u32, f64)> for Posting {
    fn from((tf, idf): (u32, f64)) -> Self { Self { tf, idf } }
}

impl From<Posting> for (u32, f64) {
    fn from(p: Posting) -> Self { (p.tf, p.idf) }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocEntry {
    /// Length of the document's full token sequence, before pruning.
    pub token_count: usize,
}

/// Inverted index over the retained (unpruned) vocabulary.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    postings: HashMap<Term, HashMap<DocId, Posting>>,
    idf: HashMap<Term, f64>,
    docs: BTreeMap<DocId, DocEntry>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Assemble an index from persisted postings. The IDF table is recovered from
    /// the postings; terms without postings are dropped.
    pub fn from_parts(postings: HashMap<Term, HashMap<DocId, Posting>>, docs: BTreeMap<DocId, DocEntry>) -> Self {
        let mut index = Self { postings, idf: HashMap::new(), docs };
        index.postings.retain(|_, plist| !plist.is_empty());
        let idf: HashMap<Term, f64> = index
            .postings
            .keys()
            .map(|t| (t.clone(), index.mean_posting_idf(t)))
            .collect();
        index.idf = idf;
        index
    }

    pub fn num_docs(&self) -> usize { self.docs.len() }

    pub fn num_terms(&self) -> usize { self.postings.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    pub fn contains_term(&self, term: &str) -> bool { self.postings.contains_key(term) }

    pub fn terms(&self) -> impl Iterator<Item = &Term> { self.postings.keys() }

    pub fn postings(&self, term: &str) -> Option<&HashMap<DocId, Posting>> { self.postings.get(term) }

    pub fn all_postings(&self) -> &HashMap<Term, HashMap<DocId, Posting>> { &self.postings }

    pub fn posting(&self, term: &str, doc: &str) -> Option<Posting> {
        self.postings.get(term).and_then(|p| p.get(doc)).copied()
    }

    /// Raw frequency of `term` in `doc`, 0 when the pair is absent.
    pub fn tf(&self, term: &str, doc: &str) -> u32 {
        self.posting(term, doc).map(|p| p.tf).unwrap_or(0)
    }

    /// IDF of a retained term; `None` means the term is ignored in scoring.
    pub fn idf(&self, term: &str) -> Option<f64> { self.idf.get(term).copied() }

    /// Mean of the idf stored in each posting of `term` (0.0 when absent).
    pub fn mean_posting_idf(&self, term: &str) -> f64 {
        match self.postings.get(term) {
            Some(plist) if !plist.is_empty() => plist.values().map(|p| p.idf).sum::<f64>() / plist.len() as f64,
            _ => 0.0,
        }
    }

    pub fn doc(&self, doc: &str) -> Option<&DocEntry> { self.docs.get(doc) }

    pub fn docs(&self) -> &BTreeMap<DocId, DocEntry> { &self.docs }

    pub fn doc_len(&self, doc: &str) -> usize {
        self.docs.get(doc).map(|d| d.token_count).unwrap_or(0)
    }

    /// Every indexed document with its token length, in ascending id order.
    pub fn documents(&self) -> Vec<(&str, usize)> {
        self.docs.iter().map(|(id, d)| (id.as_str(), d.token_count)).collect()
    }

    /// Rebuild the bag of retained terms for a document (each term repeated tf times).
    pub fn term_bag(&self, doc: &str) -> Vec<Term> {
        let mut terms: Vec<(&Term, u32)> = self
            .postings
            .iter()
            .filter_map(|(t, plist)| plist.get(doc).map(|p| (t, p.tf)))
            .collect();
        terms.sort();
        terms
            .into_iter()
            .flat_map(|(t, tf)| std::iter::repeat(t.clone()).take(tf as usize))
            .collect()
    }
}

/// Tokenize every document of a raw corpus in parallel.
pub fn tokenize_corpus(corpus: &HashMap<DocId, String>, normalizer: Normalizer) -> HashMap<DocId, Vec<Term>> {
    corpus
        .par_iter()
        .map(|(id, text)| (id.clone(), tokenize_with(text, normalizer)))
        .collect()
}

/// Tokenize and index a raw corpus.
pub fn index_corpus(corpus: &HashMap<DocId, String>, config: &IndexConfig) -> Result<InvertedIndex> {
    let tokenized = tokenize_corpus(corpus, config.normalizer);
    build_index(&tokenized, config)
}

/// Build the inverted index and pruned IDF table from tokenized documents.
///
/// Terms are ranked by document frequency (ties broken by term) and the
/// `prune_top` most frequent are dropped. Every surviving term gets
/// `idf = ln(N / df)`, copied into each of its postings.
pub fn build_index(tokenized: &HashMap<DocId, Vec<Term>>, config: &IndexConfig) -> Result<InvertedIndex> {
    if tokenized.is_empty() {
        return Err(Error::InvalidInput("cannot index an empty corpus".into()));
    }
    let n = tokenized.len() as f64;

    let mut raw: HashMap<Term, HashMap<DocId, u32>> = HashMap::new();
    let mut docs: BTreeMap<DocId, DocEntry> = BTreeMap::new();
    for (doc_id, tokens) in tokenized {
        docs.insert(doc_id.clone(), DocEntry { token_count: tokens.len() });
        for term in tokens {
            *raw.entry(term.clone()).or_default().entry(doc_id.clone()).or_insert(0) += 1;
        }
    }

    let mut by_df: Vec<(&Term, usize)> = raw.iter().map(|(t, plist)| (t, plist.len())).collect();
    by_df.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let pruned = by_df.len().min(config.prune_top);

    let idf: HashMap<Term, f64> = by_df
        .into_iter()
        .skip(config.prune_top)
        .filter(|(_, df)| *df > 0)
        .map(|(t, df)| (t.clone(), (n / df as f64).ln()))
        .collect();

    let postings: HashMap<Term, HashMap<DocId, Posting>> = raw
        .into_iter()
        .filter_map(|(term, plist)| {
            let term_idf = *idf.get(&term)?;
            let plist = plist
                .into_iter()
                .map(|(doc, tf)| (doc, Posting { tf, idf: term_idf }))
                .collect();
            Some((term, plist))
        })
        .collect();

    tracing::info!(num_docs = docs.len(), num_terms = postings.len(), pruned, "built inverted index");
    Ok(InvertedIndex { postings, idf, docs })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(docs: &[(&str, &str)]) -> HashMap<DocId, Vec<Term>> {
        docs.iter()
            .map(|(id, text)| (id.to_string(), text.split_whitespace().map(String::from).collect()))
            .collect()
    }

    fn no_prune() -> IndexConfig {
        IndexConfig { prune_top: 0, ..IndexConfig::default() }
    }

    #[test]
    fn accumulates_term_frequency() {
        let idx = build_index(&corpus(&[("d1", "a b a"), ("d2", "b c")]), &no_prune()).unwrap();
        assert_eq!(idx.tf("a", "d1"), 2);
        assert_eq!(idx.tf("a", "d2"), 0);
        assert!(idx.posting("a", "d2").is_none());
        assert_eq!(idx.doc_len("d1"), 3);
        assert!((idx.idf("b").unwrap() - 0.0).abs() < 1e-12);
        assert!((idx.idf("c").unwrap() - 2f64.ln()).abs() < 1e-12);
        assert_eq!(idx.posting("c", "d2").unwrap().idf, idx.idf("c").unwrap());
    }

    #[test]
    fn prunes_most_frequent_terms() {
        let cfg = IndexConfig { prune_top: 1, ..IndexConfig::default() };
        let idx = build_index(&corpus(&[("d1", "a b"), ("d2", "b c"), ("d3", "b")]), &cfg).unwrap();
        assert!(!idx.contains_term("b"));
        assert!(idx.idf("b").is_none());
        assert!(idx.contains_term("a"));
        assert!(idx.contains_term("c"));
        // unpruned lengths survive
        assert_eq!(idx.doc_len("d3"), 1);
    }

    #[test]
    fn prune_larger_than_vocabulary_leaves_no_terms() {
        let idx = build_index(&corpus(&[("d1", "a b")]), &IndexConfig::default()).unwrap();
        assert_eq!(idx.num_terms(), 0);
        assert_eq!(idx.num_docs(), 1);
    }

    #[test]
    fn empty_corpus_is_rejected() {
        let err = build_index(&HashMap::new(), &IndexConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn term_bag_repeats_by_tf() {
        let idx = build_index(&corpus(&[("d1", "x y x"), ("d2", "y")]), &no_prune()).unwrap();
        assert_eq!(idx.term_bag("d1"), vec!["x", "x", "y"]);
    }

    #[test]
    fn from_parts_recovers_idf() {
        let idx = build_index(&corpus(&[("d1", "a b"), ("d2", "b")]), &no_prune()).unwrap();
        let rebuilt = InvertedIndex::from_parts(idx.all_postings().clone(), idx.docs().clone());
        assert_eq!(rebuilt.idf("a"), idx.idf("a"));
        assert_eq!(rebuilt.num_terms(), idx.num_terms());
    }
}
