use medlit_core::index::index_corpus;
use medlit_core::persist::{load_index, save_docs, save_index, IndexPaths, MetaFile, FORMAT_VERSION};
use medlit_core::{DocEntry, Error, IndexConfig, Normalizer};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use tempfile::tempdir;

fn tiny_index() -> medlit_core::InvertedIndex {
    let corpus: HashMap<String, String> = [
        ("doc1.pdf", "Alpelisib is a PIK3CA inhibitor."),
        ("doc2.pdf", "Fulvestrant is a SERD."),
        ("doc3.pdf", "Alpelisib treatment in PIK3CA mutant disease."),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    index_corpus(&corpus, &IndexConfig { prune_top: 0, normalizer: Normalizer::Lemma }).unwrap()
}

fn meta(num_docs: usize, num_terms: usize) -> MetaFile {
    MetaFile {
        num_docs,
        num_terms,
        prune_top: 0,
        normalizer: Normalizer::Lemma,
        created_at: "2024-01-01T00:00:00Z".into(),
        version: FORMAT_VERSION,
    }
}

#[test]
fn save_then_load_preserves_index() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let index = tiny_index();
    save_index(&paths, &index, &meta(index.num_docs(), index.num_terms())).unwrap();

    let loaded = load_index(&paths).unwrap();
    assert_eq!(loaded.index.num_docs(), 3);
    assert_eq!(loaded.index.num_terms(), index.num_terms());
    assert_eq!(loaded.index.tf("alpelisib", "doc1.pdf"), 1);
    assert_eq!(loaded.index.idf("alpelisib"), index.idf("alpelisib"));
    assert_eq!(loaded.index.doc_len("doc3.pdf"), index.doc_len("doc3.pdf"));
    assert_eq!(loaded.normalizer(), Normalizer::Lemma);
}

#[test]
fn postings_are_tf_idf_pairs() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let index = tiny_index();
    save_index(&paths, &index, &meta(3, index.num_terms())).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(paths.index()).unwrap()).unwrap();
    let pair = raw["serd"]["doc2.pdf"].as_array().unwrap();
    assert_eq!(pair.len(), 2);
    assert_eq!(pair[0].as_u64(), Some(1));
    assert!((pair[1].as_f64().unwrap() - 3f64.ln()).abs() < 1e-12);
}

#[test]
fn bare_index_json_is_loadable() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("index.json"),
        r#"{"alpelisib": {"a.pdf": [2, 0.4], "b.pdf": [1, 0.4]}, "serd": {"c.pdf": [3, 1.1]}}"#,
    )
    .unwrap();
    let loaded = load_index(&IndexPaths::new(dir.path())).unwrap();
    assert!(loaded.meta.is_none());
    assert_eq!(loaded.index.num_docs(), 3);
    assert_eq!(loaded.index.doc_len("a.pdf"), 2);
    assert_eq!(loaded.index.doc_len("c.pdf"), 3);
    assert_eq!(loaded.index.idf("alpelisib"), Some(0.4));
}

#[test]
fn missing_index_is_not_found() {
    let dir = tempdir().unwrap();
    let err = load_index(&IndexPaths::new(dir.path().join("nope"))).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn wrong_shape_is_a_format_error() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    for bad in [
        r#"{"alpelisib": {"a.pdf": 3}}"#,
        r#"{"alpelisib": {"a.pdf": [1, 0.5, 2]}}"#,
        r#"{"alpelisib": {"a.pdf": [0, 0.5]}}"#,
        r#"{"alpelisib": {"a.pdf": [1, -0.5]}}"#,
        r#"["alpelisib"]"#,
    ] {
        fs::write(paths.index(), bad).unwrap();
        let err = load_index(&paths).unwrap_err();
        assert!(matches!(err, Error::Format { .. }), "{bad} gave {err:?}");
    }
}

#[test]
fn unsupported_meta_version_is_rejected() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let index = tiny_index();
    let mut m = meta(3, index.num_terms());
    m.version = FORMAT_VERSION + 1;
    save_index(&paths, &index, &m).unwrap();
    assert!(matches!(load_index(&paths).unwrap_err(), Error::Format { .. }));
}

#[test]
fn handle_caches_until_invalidated() {
    use medlit_core::handle::IndexHandle;
    use std::sync::Arc;

    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let index = tiny_index();
    save_index(&paths, &index, &meta(3, index.num_terms())).unwrap();

    let handle = IndexHandle::new(dir.path());
    assert!(!handle.is_loaded());
    let first = handle.get().unwrap();
    let second = handle.get().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    handle.invalidate();
    assert!(!handle.is_loaded());
    let third = handle.get().unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(third.index.num_docs(), 3);
}

#[test]
fn handle_reports_missing_directory() {
    let dir = tempdir().unwrap();
    let handle = medlit_core::handle::IndexHandle::new(dir.path().join("absent"));
    assert!(matches!(handle.get(), Err(Error::NotFound { .. })));
    assert!(!handle.is_loaded());
}

#[test]
fn docs_missing_a_posted_document_are_rejected() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let index = tiny_index();
    save_index(&paths, &index, &meta(3, index.num_terms())).unwrap();

    let partial: BTreeMap<String, DocEntry> = index
        .docs()
        .iter()
        .filter(|(id, _)| id.as_str() != "doc2.pdf")
        .map(|(id, d)| (id.clone(), d.clone()))
        .collect();
    save_docs(&paths, &partial).unwrap();
    match load_index(&paths).unwrap_err() {
        Error::Format { path, message } => {
            assert_eq!(path, paths.docs());
            assert!(message.contains("doc2.pdf"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
