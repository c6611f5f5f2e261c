//! Recency re-weighting and near-duplicate suppression of a ranked list.

use crate::config::FilterConfig;
use crate::index::DocId;
use crate::retrieval::Hit;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

lazy_static! {
    static ref YEAR_RE: Regex = Regex::new(r"(?:^|[^0-9])((?:19|20)[0-9]{2})(?:[^0-9]|$)").expect("valid regex");
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub doc_id: DocId,
    /// Score assigned by the retriever.
    pub score: f64,
    pub year: Option<i32>,
    /// `score` times the recency weight.
    pub combined: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "candidates", rename_all = "lowercase")]
pub enum FilterOutcome {
    /// Documents that passed every step.
    Validated(Vec<Candidate>),
    /// Nothing survived; the unfiltered input with adjusted scores.
    Fallback(Vec<Candidate>),
}

impl FilterOutcome {
    pub fn candidates(&self) -> &[Candidate] {
        match self {
            FilterOutcome::Validated(c) | FilterOutcome::Fallback(c) => c,
        }
    }

    pub fn into_candidates(self) -> Vec<Candidate> {
        match self {
            FilterOutcome::Validated(c) | FilterOutcome::Fallback(c) => c,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, FilterOutcome::Fallback(_))
    }
}

/// Weight in [0, 1]: 0 for unknown or pre-`min_year` documents, rising linearly
/// from 0.5 at `min_year` to 1.0 at `current_year`.
pub fn recency_weight(year: Option<i32>, current_year: i32, min_year: i32) -> f64 {
    let year = match year {
        Some(y) if y >= min_year => y,
        _ => return 0.0,
    };
    if current_year <= min_year {
        return 1.0;
    }
    let w = 0.5 + 0.5 * (year - min_year) as f64 / (current_year - min_year) as f64;
    w.min(1.0)
}

/// First plausible publication year (1900-2099) embedded in a document name.
pub fn infer_year(doc_id: &str) -> Option<i32> {
    YEAR_RE.captures(doc_id).and_then(|c| c[1].parse().ok())
}

/// Run the post-ranking filter over `hits`.
///
/// Steps: drop documents published before `min_year`, drop scores below the
/// validation threshold, weight by recency, then walk by descending combined
/// score keeping a document only if its similarity to every kept document is
/// at most the redundancy threshold. When nothing survives the input is
/// returned as a [`FilterOutcome::Fallback`] with adjusted scores.
pub fn filter_candidates<Y, S>(
    hits: &[Hit],
    year_of: Y,
    similarity: S,
    config: &FilterConfig,
    current_year: i32,
) -> FilterOutcome
where
    Y: Fn(&str) -> Option<i32>,
    S: Fn(&str, &str) -> f64,
{
    let adjusted: Vec<Candidate> = hits
        .iter()
        .map(|h| {
            let year = year_of(&h.doc_id);
            Candidate {
                doc_id: h.doc_id.clone(),
                score: h.score,
                year,
                combined: h.score * recency_weight(year, current_year, config.min_year),
            }
        })
        .collect();

    let mut survivors: Vec<Candidate> = adjusted
        .iter()
        .filter(|c| !matches!(c.year, Some(y) if y < config.min_year))
        .filter(|c| c.score >= config.validation_threshold)
        .cloned()
        .collect();
    survivors.sort_by(|a, b| b.combined.partial_cmp(&a.combined).unwrap_or(Ordering::Equal));

    let mut accepted: Vec<Candidate> = Vec::with_capacity(survivors.len());
    for c in survivors {
        let redundant = accepted
            .iter()
            .any(|kept| similarity(&c.doc_id, &kept.doc_id) > config.redundancy_threshold);
        if redundant {
            tracing::debug!(doc = %c.doc_id, "dropped near-duplicate");
        } else {
            accepted.push(c);
        }
    }

    if accepted.is_empty() {
        tracing::warn!(candidates = adjusted.len(), "no document validated, falling back to unfiltered candidates");
        return FilterOutcome::Fallback(adjusted);
    }
    FilterOutcome::Validated(accepted)
}
