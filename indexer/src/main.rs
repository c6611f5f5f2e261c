use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use medlit_core::filter::{infer_year, FilterOutcome};
use medlit_core::handle::IndexHandle;
use medlit_core::index::index_corpus;
use medlit_core::persist::{save_index, IndexPaths, MetaFile, FORMAT_VERSION};
use medlit_core::pipeline::{filter_hits, rank_recommendations};
use medlit_core::query::RecommendationFile;
use medlit_core::retrieval::{bm25, rank};
use medlit_core::{Config, Hit, InvertedIndex, Normalizer, Query, Strategy};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

mod corpus;

#[derive(Parser)]
#[command(name = "medlit")]
#[command(about = "Build and query a literature index for treatment recommendations", long_about = None)]
struct Cli {
    /// JSON config file; command-line flags take precedence
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from .txt/.json/.jsonl files
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: PathBuf,
        /// Output index directory
        #[arg(long)]
        output: PathBuf,
        /// Number of most frequent terms to drop
        #[arg(long)]
        prune_top: Option<usize>,
        /// Term normalization: lemma or stem
        #[arg(long)]
        normalizer: Option<Normalizer>,
    },
    /// Rank documents for a recommendations file or a free-text query
    Search {
        /// Index directory
        #[arg(long, default_value = "./index")]
        index: PathBuf,
        /// Recommendations JSON file ({"recommendations": [...]})
        #[arg(long, conflicts_with = "query", required_unless_present = "query")]
        recommendations: Option<PathBuf>,
        /// Free text; words may carry a weight, e.g. "metastatic:2"
        #[arg(long)]
        query: Option<String>,
        /// boolean, vector or bm25
        #[arg(long, default_value = "vector")]
        strategy: Strategy,
        /// Number of results per query
        #[arg(long)]
        top_k: Option<usize>,
        /// Minimum distinct matching terms for boolean retrieval
        #[arg(long)]
        min_match: Option<usize>,
        /// Apply recency weighting and near-duplicate suppression
        #[arg(long, default_value_t = false)]
        filter: bool,
        /// JSON map of document id -> publication year; otherwise years are read from names
        #[arg(long)]
        years: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Build { input, output, prune_top, normalizer } => {
            if let Some(n) = prune_top { config.index.prune_top = n; }
            if let Some(n) = normalizer { config.index.normalizer = n; }
            build(&input, &output, &config)
        }
        Commands::Search { index, recommendations, query, strategy, top_k, min_match, filter, years } => {
            if let Some(m) = min_match { config.retrieval.min_match = m; }
            let top_k = top_k.unwrap_or(config.retrieval.curator_top_k);
            let years = match years {
                Some(path) => load_years(&path)?,
                None => HashMap::new(),
            };
            let opts = SearchOptions { strategy, top_k, filter, years };
            let out = match (recommendations, query) {
                (Some(path), _) => search_recommendations(&index, &path, &opts, &config)?,
                (None, Some(text)) => search_text(&index, &text, &opts, &config)?,
                (None, None) => bail!("either --recommendations or --query is required"),
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
    }
}

fn build(input: &Path, output: &Path, config: &Config) -> Result<()> {
    let corpus = corpus::load_corpus(input)?;
    let index = index_corpus(&corpus, &config.index)
        .with_context(|| format!("indexing {}", input.display()))?;

    let meta = MetaFile {
        num_docs: index.num_docs(),
        num_terms: index.num_terms(),
        prune_top: config.index.prune_top,
        normalizer: config.index.normalizer,
        created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        version: FORMAT_VERSION,
    };
    save_index(&IndexPaths::new(output), &index, &meta)?;
    tracing::info!(output = %output.display(), "index build complete");
    Ok(())
}

struct SearchOptions {
    strategy: Strategy,
    top_k: usize,
    filter: bool,
    years: HashMap<String, i32>,
}

impl SearchOptions {
    fn year_of(&self, doc: &str) -> Option<i32> {
        self.years.get(doc).copied().or_else(|| infer_year(doc))
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Ranked {
    Hits(Vec<Hit>),
    Filtered(FilterOutcome),
}

#[derive(Serialize)]
struct TreatmentOutput {
    treatment: String,
    node_path: String,
    results: Ranked,
}

#[derive(Serialize)]
struct QueryOutput {
    terms: Vec<String>,
    results: Ranked,
}

fn finish(index: &InvertedIndex, mut hits: Vec<Hit>, opts: &SearchOptions, config: &Config) -> Ranked {
    if opts.filter {
        let current_year = time::OffsetDateTime::now_utc().year();
        return Ranked::Filtered(filter_hits(index, &hits, |d| opts.year_of(d), &config.filter, current_year));
    }
    hits.truncate(opts.top_k);
    Ranked::Hits(hits)
}

fn search_recommendations(index_dir: &Path, path: &Path, opts: &SearchOptions, config: &Config) -> Result<serde_json::Value> {
    let loaded = IndexHandle::new(index_dir).get()?;
    let file = RecommendationFile::from_file(path)?;
    if file.recommendations.is_empty() {
        tracing::warn!(file = %path.display(), "no recommendations in file");
    }
    let ranked = rank_recommendations(&loaded.index, &file.recommendations, loaded.normalizer(), opts.strategy, &config.retrieval);
    let out: Vec<TreatmentOutput> = ranked
        .into_iter()
        .map(|r| TreatmentOutput {
            treatment: r.treatment,
            node_path: r.node_path,
            results: finish(&loaded.index, r.results, opts, config),
        })
        .collect();
    Ok(serde_json::to_value(out)?)
}

fn search_text(index_dir: &Path, text: &str, opts: &SearchOptions, config: &Config) -> Result<serde_json::Value> {
    let loaded = IndexHandle::new(index_dir).get()?;
    let query = Query::from_weighted_text(text, loaded.normalizer());
    let hits = match opts.strategy {
        Strategy::Bm25 => bm25::evidence_curator(&loaded.index, &query, &loaded.index.documents(), config.retrieval.bm25, opts.top_k),
        other => rank(&loaded.index, &query, other, &config.retrieval),
    };
    let out = QueryOutput { terms: query.terms().to_vec(), results: finish(&loaded.index, hits, opts, config) };
    Ok(serde_json::to_value(out)?)
}

fn load_years(path: &Path) -> Result<HashMap<String, i32>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
