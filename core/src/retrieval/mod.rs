//! The three ranking strategies over a shared, read-only index.

pub mod bm25;
pub mod boolean;
pub mod vector;

use crate::config::RetrievalConfig;
use crate::index::{DocId, InvertedIndex};
use crate::query::Query;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A ranked document. Score semantics depend on the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub doc_id: DocId,
    pub score: f64,
}

impl Hit {
    pub fn new(doc_id: impl Into<DocId>, score: f64) -> Self {
        Self { doc_id: doc_id.into(), score }
    }
}

/// Stable sort by descending score; ties keep their incoming order.
pub(crate) fn sort_desc(hits: &mut [Hit]) {
    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Boolean,
    #[default]
    Vector,
    Bm25,
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Ok(Strategy::Boolean),
            "vector" | "tfidf" => Ok(Strategy::Vector),
            "bm25" | "proba" => Ok(Strategy::Bm25),
            other => Err(format!("unknown strategy '{other}'")),
        }
    }
}

/// Rank the whole corpus for `query` with the chosen strategy.
///
/// Boolean results are the coverage-filtered set ordered by summed tf and
/// capped at `boolean_top`; vector and BM25 rank every document.
pub fn rank(index: &InvertedIndex, query: &Query, strategy: Strategy, config: &RetrievalConfig) -> Vec<Hit> {
    let docs = index.documents();
    let hits = match strategy {
        Strategy::Boolean => {
            let matched = boolean::boolean_search(index, query.terms(), config.min_match, config.boolean_top);
            boolean::rank_by_tf(index, query.terms(), &matched, config.boolean_top)
        }
        Strategy::Vector => vector::rank_documents(index, query, &docs, config.vector_idf),
        Strategy::Bm25 => bm25::rank_documents(index, query, &docs, config.bm25),
    };
    tracing::debug!(?strategy, terms = query.len(), hits = hits.len(), "ranked query");
    hits
}
