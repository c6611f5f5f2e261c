//! Query construction from treatment recommendations and free text.

use crate::config::Normalizer;
use crate::error::{Error, Result};
use crate::index::Term;
use crate::tokenizer::tokenize_with;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A recommendation produced by the rule engine. Only the text fields used
/// for retrieval are modelled; anything else in the record is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Recommendation {
    pub keywords: Vec<String>,
    pub treatment: String,
    pub rationale: String,
    pub subtype: String,
    pub biomarker_summary: String,
    pub node_path: String,
}

impl Recommendation {
    /// Every field joined into one blob, with the decision path cleaned.
    pub fn query_text(&self) -> String {
        let path = clean_node_path(&self.node_path);
        let mut fields: Vec<&str> = self.keywords.iter().map(String::as_str).collect();
        fields.extend([
            self.treatment.as_str(),
            self.rationale.as_str(),
            self.subtype.as_str(),
            self.biomarker_summary.as_str(),
            path.as_str(),
        ]);
        collapse_whitespace(&fields.join(" "))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationFile {
    pub recommendations: Vec<Recommendation>,
}

impl RecommendationFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::from_io(path, e))?;
        serde_json::from_str(&text).map_err(|e| Error::format(path, e))
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turn a decision path such as `ER+ → HER2‑ > Visceral` into plain words:
/// arrows and `>` become spaces, non-ASCII hyphens become `-`.
pub fn clean_node_path(path: &str) -> String {
    let replaced: String = path
        .chars()
        .map(|c| match c {
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '→' | '⇒' | '⟶' | '➔' | '>' => ' ',
            other => other,
        })
        .collect();
    collapse_whitespace(&replaced)
}

/// Upper bound on the repetition count of a single `word:weight` token.
pub const MAX_WEIGHT: usize = 100;

/// Resolve the `word:weight` notation into a repetition count. Unparsable
/// weights count as 1; fractional weights are truncated, so anything below 1
/// drops the word. Counts are capped at [`MAX_WEIGHT`].
fn repetitions(weight: &str) -> usize {
    match weight.trim().parse::<f64>() {
        Ok(w) if w.is_finite() => w.trunc().clamp(0.0, MAX_WEIGHT as f64) as usize,
        _ => 1,
    }
}

/// Expand `word:weight` tokens by literal repetition.
pub fn expand_weights(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for token in text.split_whitespace() {
        match token.rsplit_once(':') {
            Some((word, weight)) => out.extend(std::iter::repeat(word).take(repetitions(weight))),
            None => out.push(token),
        }
    }
    out.join(" ")
}

/// Parse the textual report of the rule engine and collect the comma-separated
/// keywords that follow `Keywords:`, up to a blank line or `Decision Path:`.
/// Duplicates are kept.
pub fn keywords_from_report(report: &str) -> Vec<String> {
    fn push_all(line: &str, out: &mut Vec<String>) {
        out.extend(line.split(',').map(|k| k.trim().to_lowercase()).filter(|k| !k.is_empty()));
    }
    let mut keywords = Vec::new();
    let mut in_keywords = false;
    for line in report.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("Keywords:") {
            in_keywords = true;
            push_all(rest, &mut keywords);
        } else if in_keywords {
            if line.is_empty() || line.starts_with("Decision Path:") {
                in_keywords = false;
            } else {
                push_all(line, &mut keywords);
            }
        }
    }
    keywords
}

/// A weighted multiset of normalized terms. Weights are occurrence counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    terms: Vec<Term>,
    counts: HashMap<Term, u32>,
}

impl Query {
    /// Build from already-normalized terms, keeping first-occurrence order.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Term>,
    {
        let mut q = Query::default();
        for t in terms {
            let t = t.into();
            let count = q.counts.entry(t.clone()).or_insert(0);
            if *count == 0 {
                q.terms.push(t);
            }
            *count += 1;
        }
        q
    }

    pub fn parse(text: &str, normalizer: Normalizer) -> Self {
        Self::from_terms(tokenize_with(text, normalizer))
    }

    pub fn from_recommendation(rec: &Recommendation, normalizer: Normalizer) -> Self {
        Self::parse(&rec.query_text(), normalizer)
    }

    /// Free-text entry where words may carry a `word:weight` suffix.
    pub fn from_weighted_text(text: &str, normalizer: Normalizer) -> Self {
        Self::parse(&expand_weights(text), normalizer)
    }

    /// Distinct terms in first-occurrence order.
    pub fn terms(&self) -> &[Term] { &self.terms }

    pub fn count(&self, term: &str) -> u32 { self.counts.get(term).copied().unwrap_or(0) }

    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }
}
