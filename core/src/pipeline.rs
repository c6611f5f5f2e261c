//! Glue from recommendation records to ranked, optionally filtered evidence.

use crate::config::{FilterConfig, Normalizer, RetrievalConfig};
use crate::filter::{filter_candidates, FilterOutcome};
use crate::index::InvertedIndex;
use crate::query::{clean_node_path, Query, Recommendation};
use crate::retrieval::{rank, vector::content_similarity, Hit, Strategy};
use serde::Serialize;

/// Ranked documents for one recommended treatment.
#[derive(Debug, Clone, Serialize)]
pub struct TreatmentResults {
    pub treatment: String,
    pub node_path: String,
    pub results: Vec<Hit>,
}

/// Rank the corpus once per recommendation.
pub fn rank_recommendations(
    index: &InvertedIndex,
    recommendations: &[Recommendation],
    normalizer: Normalizer,
    strategy: Strategy,
    config: &RetrievalConfig,
) -> Vec<TreatmentResults> {
    recommendations
        .iter()
        .map(|rec| {
            let query = Query::from_recommendation(rec, normalizer);
            TreatmentResults {
                treatment: rec.treatment.clone(),
                node_path: clean_node_path(&rec.node_path),
                results: rank(index, &query, strategy, config),
            }
        })
        .collect()
}

/// Apply the post-ranking filter to the head of a ranking, using document
/// content vectors for redundancy checks.
pub fn filter_hits<Y>(
    index: &InvertedIndex,
    hits: &[Hit],
    year_of: Y,
    config: &FilterConfig,
    current_year: i32,
) -> FilterOutcome
where
    Y: Fn(&str) -> Option<i32>,
{
    let pool = &hits[..hits.len().min(config.candidate_pool)];
    filter_candidates(pool, year_of, |a, b| content_similarity(index, a, b), config, current_year)
}
