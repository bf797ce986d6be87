use super::domain::NeighbourhoodLookup;
use super::sources::{
    load_lookup, ListingsTable, LoadError, ModelArtifact, NeighbourhoodBoundaries,
};
use crate::config::ResolvedSources;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::SystemTime;
use tracing::debug;

/// Version marker for a source file; any change forces a reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl SourceStamp {
    pub fn read(path: &Path) -> Result<Self, LoadError> {
        let metadata = std::fs::metadata(path).map_err(|err| LoadError::io(path, err))?;
        Ok(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

struct Slot<T> {
    stamp: SourceStamp,
    value: Arc<T>,
}

/// Immutable values keyed by source path, loaded on first use.
pub struct SourceCache<T> {
    slots: Mutex<HashMap<PathBuf, Slot<T>>>,
}

impl<T> Default for SourceCache<T> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> SourceCache<T> {
    pub fn get_or_load<F>(&self, path: &Path, load: F) -> Result<Arc<T>, LoadError>
    where
        F: FnOnce(&Path) -> Result<T, LoadError>,
    {
        let stamp = SourceStamp::read(path)?;

        {
            let guard = self.slots.lock().expect("source cache mutex poisoned");
            if let Some(slot) = guard.get(path) {
                if slot.stamp == stamp {
                    debug!(path = %path.display(), "source cache hit");
                    return Ok(slot.value.clone());
                }
            }
        }

        // Loads run outside the lock; a concurrent miss at worst loads twice.
        let value = Arc::new(load(path)?);
        let mut guard = self.slots.lock().expect("source cache mutex poisoned");
        guard.insert(
            path.to_path_buf(),
            Slot {
                stamp,
                value: value.clone(),
            },
        );
        Ok(value)
    }

    pub fn invalidate(&self, path: &Path) -> bool {
        let mut guard = self.slots.lock().expect("source cache mutex poisoned");
        guard.remove(path).is_some()
    }

    pub fn clear(&self) {
        self.slots.lock().expect("source cache mutex poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.slots.lock().expect("source cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Every dataset the explorer reads in one pass, shared read-only.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    pub listings: Arc<ListingsTable>,
    pub lookup: Arc<NeighbourhoodLookup>,
    pub boundaries: Arc<NeighbourhoodBoundaries>,
    pub model: Option<Arc<ModelArtifact>>,
}

#[derive(Default)]
pub struct DatasetCache {
    listings: SourceCache<ListingsTable>,
    lookup: SourceCache<NeighbourhoodLookup>,
    boundaries: SourceCache<NeighbourhoodBoundaries>,
    models: SourceCache<ModelArtifact>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache shared by every interaction.
    pub fn global() -> &'static DatasetCache {
        static CACHE: OnceLock<DatasetCache> = OnceLock::new();
        CACHE.get_or_init(DatasetCache::new)
    }

    pub fn snapshot(&self, sources: &ResolvedSources) -> Result<DatasetSnapshot, LoadError> {
        let listings = self
            .listings
            .get_or_load(&sources.listings, |path| ListingsTable::from_path(path))?;
        let lookup = self
            .lookup
            .get_or_load(&sources.neighbourhoods, |path| load_lookup(path))?;
        let boundaries = self
            .boundaries
            .get_or_load(&sources.boundaries, |path| {
                NeighbourhoodBoundaries::from_path(path)
            })?;
        let model = sources
            .model
            .as_deref()
            .map(|path| {
                self.models
                    .get_or_load(path, |path| ModelArtifact::from_path(path))
            })
            .transpose()?;

        Ok(DatasetSnapshot {
            listings,
            lookup,
            boundaries,
            model,
        })
    }

    /// Drops any cached value read from `path`; returns whether one existed.
    pub fn invalidate(&self, path: &Path) -> bool {
        let listings = self.listings.invalidate(path);
        let lookup = self.lookup.invalidate(path);
        let boundaries = self.boundaries.invalidate(path);
        let models = self.models.invalidate(path);
        listings || lookup || boundaries || models
    }

    pub fn clear(&self) {
        self.listings.clear();
        self.lookup.clear();
        self.boundaries.clear();
        self.models.clear();
    }
}
