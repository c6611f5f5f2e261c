use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Term normalization policy. Documents and queries must share one policy,
/// so the choice made at build time is persisted with the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalizer {
    /// Part-of-speech guided lemmatization (noun lemma by default).
    #[default]
    Lemma,
    /// Snowball English stemming.
    Stem,
}

impl std::str::FromStr for Normalizer {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lemma" => Ok(Normalizer::Lemma),
            "stem" => Ok(Normalizer::Stem),
            other => Err(format!("unknown normalizer '{other}', expected 'lemma' or 'stem'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Number of highest document-frequency terms dropped as corpus-wide stopwords.
    pub prune_top: usize,
    pub normalizer: Normalizer,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { prune_top: 1000, normalizer: Normalizer::Lemma }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

/// Where the vector retriever takes a term's IDF from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorIdf {
    /// The single per-term value from the IDF table.
    #[default]
    Term,
    /// Mean of the IDF denormalized into every posting of the term.
    PostingMean,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub min_match: usize,
    pub boolean_top: usize,
    pub bm25: Bm25Params,
    pub curator_top_k: usize,
    pub vector_idf: VectorIdf,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            min_match: 2,
            boolean_top: 5,
            bm25: Bm25Params::default(),
            curator_top_k: 15,
            vector_idf: VectorIdf::Term,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub min_year: i32,
    pub validation_threshold: f64,
    pub redundancy_threshold: f64,
    /// How many top-ranked hits are handed to the filter.
    pub candidate_pool: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { min_year: 2015, validation_threshold: 0.2, redundancy_threshold: 0.9, candidate_pool: 5 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub index: IndexConfig,
    pub retrieval: RetrievalConfig,
    pub filter: FilterConfig,
}

impl Config {
    /// Load a JSON config file. Absent sections fall back to defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::from_io(path, e))?;
        serde_json::from_str(&text).map_err(|e| Error::format(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"retrieval": {"min_match": 3}}"#).unwrap();
        assert_eq!(cfg.retrieval.min_match, 3);
        assert_eq!(cfg.retrieval.boolean_top, 5);
        assert_eq!(cfg.index.prune_top, 1000);
        assert_eq!(cfg.filter.min_year, 2015);
        assert!((cfg.retrieval.bm25.k1 - 1.5).abs() < 1e-12);
    }

    #[test]
    fn normalizer_parses() {
        assert_eq!("Stem".parse::<Normalizer>().unwrap(), Normalizer::Stem);
        assert!("porter".parse::<Normalizer>().is_err());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = Config::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
