use anyhow::{bail, Context, Result};
use serde::Deserialize;
use walkdir::WalkDir;

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A pre-extracted document record in `.json` / `.jsonl` inputs.
#[derive(Debug, Deserialize)]
struct InputDoc {
    id: String,
    text: String,
}

/// Read `{document id -> raw text}` from a file or directory tree.
///
/// `.txt` files contribute one document named after the file; `.json` files
/// hold one record or an array of records; `.jsonl` files hold one record per line.
pub fn load_corpus(input: &Path) -> Result<HashMap<String, String>> {
    if !input.exists() {
        bail!("input path {} does not exist", input.display());
    }
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(extension(p), Some("txt" | "json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else {
        files.push(input.to_path_buf());
    }
    files.sort();

    let mut corpus = HashMap::new();
    for file in files {
        match extension(&file) {
            Some("jsonl") => read_jsonl(&file, &mut corpus)?,
            Some("json") => read_json(&file, &mut corpus)?,
            _ => read_text(&file, &mut corpus)?,
        }
    }
    tracing::info!(num_docs = corpus.len(), "loaded corpus");
    Ok(corpus)
}

fn extension(p: &Path) -> Option<&str> {
    p.extension().and_then(|s| s.to_str())
}

fn insert(corpus: &mut HashMap<String, String>, id: String, text: String) {
    if corpus.insert(id.clone(), text).is_some() {
        tracing::warn!(%id, "duplicate document id, keeping the last one");
    }
}

fn read_text(file: &Path, corpus: &mut HashMap<String, String>) -> Result<()> {
    let id = file
        .file_name()
        .and_then(|s| s.to_str())
        .with_context(|| format!("unusable file name {}", file.display()))?
        .to_string();
    let text = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    insert(corpus, id, text);
    Ok(())
}

fn read_jsonl(file: &Path, corpus: &mut HashMap<String, String>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), n + 1))?;
        insert(corpus, doc.id, doc.text);
    }
    Ok(())
}

fn read_json(file: &Path, corpus: &mut HashMap<String, String>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("parsing {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                let doc: InputDoc = serde_json::from_value(v)?;
                insert(corpus, doc.id, doc.text);
            }
        }
        serde_json::Value::Object(_) => {
            let doc: InputDoc = serde_json::from_value(json)?;
            insert(corpus, doc.id, doc.text);
        }
        _ => tracing::warn!(file = %file.display(), "ignoring json that is neither a record nor an array"),
    }
    Ok(())
}
