//! Indexing and ranking engine for a corpus of scientific-article text.
//!
//! Documents are tokenized into lemmatized terms, gathered into an inverted
//! index with a pruned IDF table, and ranked against queries built from
//! treatment recommendations by one of three retrievers (boolean coverage,
//! TF-IDF cosine, BM25). A post-ranking filter re-weights by recency and
//! suppresses near-duplicates.

pub mod config;
pub mod error;
pub mod filter;
pub mod handle;
pub mod index;
pub mod lemmatizer;
pub mod persist;
pub mod pipeline;
pub mod query;
pub mod retrieval;
pub mod tokenizer;

pub use config::{Config, FilterConfig, IndexConfig, Normalizer, RetrievalConfig};
pub use error::{Error, Result};
pub use index::{build_index, DocEntry, DocId, InvertedIndex, Posting, Term};
pub use query::{Query, Recommendation};
pub use retrieval::{Hit, Strategy};
