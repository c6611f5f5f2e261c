use crate::error::Result;
use crate::persist::{load_index, IndexPaths, LoadedIndex};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared, lazily loaded view of an index directory.
///
/// The first [`get`](IndexHandle::get) reads the index from disk; later calls
/// hand out the same `Arc`. The cached index must be dropped with
/// [`invalidate`](IndexHandle::invalidate) whenever the directory is rebuilt
/// from a changed corpus. Readers holding an `Arc` keep the old snapshot.
pub struct IndexHandle {
    root: PathBuf,
    cached: RwLock<Option<Arc<LoadedIndex>>>,
}

impl IndexHandle {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf(), cached: RwLock::new(None) }
    }

    pub fn root(&self) -> &Path { &self.root }

    pub fn get(&self) -> Result<Arc<LoadedIndex>> {
        if let Some(idx) = self.cached.read().as_ref() {
            return Ok(Arc::clone(idx));
        }
        let mut slot = self.cached.write();
        // another caller may have loaded it while we waited for the lock
        if let Some(idx) = slot.as_ref() {
            return Ok(Arc::clone(idx));
        }
        let loaded = Arc::new(load_index(&IndexPaths::new(&self.root))?);
        *slot = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Load from disk now, replacing any cached snapshot.
    pub fn reload(&self) -> Result<Arc<LoadedIndex>> {
        let loaded = Arc::new(load_index(&IndexPaths::new(&self.root))?);
        *self.cached.write() = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    pub fn invalidate(&self) {
        self.cached.write().take();
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.read().is_some()
    }
}
