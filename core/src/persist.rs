use crate::config::Normalizer;
use crate::error::{Error, Result};
use crate::index::{DocEntry, DocId, InvertedIndex, Posting, Term};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: usize,
    pub num_terms: usize,
    pub prune_top: usize,
    pub normalizer: Normalizer,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn index(&self) -> PathBuf { self.root.join("index.json") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    pub fn docs(&self) -> PathBuf { self.root.join("docs.bin") }
}

/// An index read back from disk together with its build metadata.
#[derive(Debug, Clone)]
pub struct LoadedIndex {
    pub index: InvertedIndex,
    pub meta: Option<MetaFile>,
}

impl LoadedIndex {
    /// Normalization policy queries must use against this index.
    pub fn normalizer(&self) -> Normalizer {
        self.meta.as_ref().map(|m| m.normalizer).unwrap_or_default()
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| Error::from_io(path, e))
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

/// Write `term -> { doc_id -> [tf, idf] }` as pretty JSON.
pub fn save_postings(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    let path = paths.index();
    // BTreeMap for a stable, diffable file
    let ordered: BTreeMap<&Term, BTreeMap<&DocId, &Posting>> = index
        .all_postings()
        .iter()
        .map(|(t, plist)| (t, plist.iter().collect()))
        .collect();
    let mut w = create(&path)?;
    serde_json::to_writer_pretty(&mut w, &ordered).map_err(|e| Error::format(&path, e))?;
    w.flush()?;
    Ok(())
}

pub fn load_postings(paths: &IndexPaths) -> Result<HashMap<Term, HashMap<DocId, Posting>>> {
    let path = paths.index();
    let reader = BufReader::new(open(&path)?);
    let postings: HashMap<Term, HashMap<DocId, Posting>> =
        serde_json::from_reader(reader).map_err(|e| Error::format(&path, e))?;
    for (term, plist) in &postings {
        for (doc, p) in plist {
            if p.tf == 0 {
                return Err(Error::format(&path, format!("zero tf for ({term}, {doc})")));
            }
            if !p.idf.is_finite() || p.idf < 0.0 {
                return Err(Error::format(&path, format!("invalid idf {} for term {term}", p.idf)));
            }
        }
    }
    Ok(postings)
}

pub fn save_docs(paths: &IndexPaths, docs: &BTreeMap<DocId, DocEntry>) -> Result<()> {
    create_dir_all(&paths.root)?;
    let path = paths.docs();
    let bytes = bincode::serialize(docs).map_err(|e| Error::format(&path, e))?;
    let mut w = create(&path)?;
    w.write_all(&bytes)?;
    w.flush()?;
    Ok(())
}

pub fn load_docs(paths: &IndexPaths) -> Result<BTreeMap<DocId, DocEntry>> {
    let path = paths.docs();
    let bytes = std::fs::read(&path).map_err(|e| Error::from_io(&path, e))?;
    bincode::deserialize(&bytes).map_err(|e| Error::format(&path, e))
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let path = paths.meta();
    let json = serde_json::to_string_pretty(meta).map_err(|e| Error::format(&path, e))?;
    std::fs::write(&path, json)?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let path = paths.meta();
    let text = std::fs::read_to_string(&path).map_err(|e| Error::from_io(&path, e))?;
    let meta: MetaFile = serde_json::from_str(&text).map_err(|e| Error::format(&path, e))?;
    if meta.version != FORMAT_VERSION {
        return Err(Error::format(&path, format!("unsupported version {}", meta.version)));
    }
    Ok(meta)
}

/// Persist every artifact of an index.
pub fn save_index(paths: &IndexPaths, index: &InvertedIndex, meta: &MetaFile) -> Result<()> {
    save_postings(paths, index)?;
    save_docs(paths, index.docs())?;
    save_meta(paths, meta)?;
    tracing::info!(root = %paths.root.display(), num_terms = index.num_terms(), "saved index");
    Ok(())
}

/// Load an index directory. Only `index.json` is required: without `docs.bin`
/// document lengths are rebuilt from the postings (sum of retained tf).
pub fn load_index(paths: &IndexPaths) -> Result<LoadedIndex> {
    let postings = load_postings(paths)?;
    let meta = match load_meta(paths) {
        Ok(m) => Some(m),
        Err(Error::NotFound { .. }) => None,
        Err(e) => return Err(e),
    };
    let docs = match load_docs(paths) {
        Ok(d) => {
            check_docs_cover_postings(&paths.docs(), &postings, &d)?;
            d
        }
        Err(Error::NotFound { .. }) => {
            tracing::warn!(root = %paths.root.display(), "docs.bin missing, deriving lengths from postings");
            lengths_from_postings(&postings)
        }
        Err(e) => return Err(e),
    };
    let index = InvertedIndex::from_parts(postings, docs);
    tracing::info!(num_docs = index.num_docs(), num_terms = index.num_terms(), "loaded index");
    Ok(LoadedIndex { index, meta })
}

fn check_docs_cover_postings(
    path: &Path,
    postings: &HashMap<Term, HashMap<DocId, Posting>>,
    docs: &BTreeMap<DocId, DocEntry>,
) -> Result<()> {
    for plist in postings.values() {
        if let Some(doc) = plist.keys().find(|d| !docs.contains_key(d.as_str())) {
            return Err(Error::format(path, format!("no length recorded for document {doc}")));
        }
    }
    Ok(())
}

fn lengths_from_postings(postings: &HashMap<Term, HashMap<DocId, Posting>>) -> BTreeMap<DocId, DocEntry> {
    let mut docs: BTreeMap<DocId, DocEntry> = BTreeMap::new();
    for plist in postings.values() {
        for (doc, p) in plist {
            docs.entry(doc.clone()).or_default().token_count += p.tf as usize;
        }
    }
    docs
}
