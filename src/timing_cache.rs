//! Word-timing lookup with a pluggable cache.
//!
//! Word boundaries for a reference recitation come from an external source
//! ([`WordTimingLoader`]) and are kept in a [`WordTimingStore`]. The
//! [`CachedTimingSource`] ties the two together: store hits are returned
//! as-is, misses are loaded and written through to the store.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::types::WordBoundary;

/// Identifies one reference verse by one reciter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceKey {
    pub reciter: String,
    pub chapter: u32,
    pub verse: u32,
}

impl ReferenceKey {
    pub fn new(reciter: impl Into<String>, chapter: u32, verse: u32) -> Self {
        Self {
            reciter: reciter.into(),
            chapter,
            verse,
        }
    }

    /// `{reciter}_{chapter:03}_{verse:03}`, e.g. `alafasy_001_007`.
    pub fn file_stem(&self) -> Result<String, ScoringError> {
        let reciter = self.reciter.trim();
        let valid = !reciter.is_empty()
            && reciter
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && reciter != "."
            && reciter != "..";
        if !valid {
            return Err(ScoringError::invalid_input(format!(
                "reciter id {:?} is not usable as a file name",
                self.reciter
            )));
        }
        Ok(format!("{reciter}_{:03}_{:03}", self.chapter, self.verse))
    }
}

impl fmt::Display for ReferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.reciter, self.chapter, self.verse)
    }
}

pub trait WordTimingStore: Send + Sync {
    fn get(&self, key: &ReferenceKey) -> Result<Option<Vec<WordBoundary>>, ScoringError>;

    fn put(&self, key: &ReferenceKey, words: &[WordBoundary]) -> Result<(), ScoringError>;
}

/// Fetches word timings from their source of truth. `Ok(None)` means the
/// source has no timings for the key.
pub trait WordTimingLoader: Send + Sync {
    fn load(&self, key: &ReferenceKey) -> Result<Option<Vec<WordBoundary>>, ScoringError>;
}

#[derive(Debug, Default)]
pub struct InMemoryTimingStore {
    entries: Mutex<HashMap<ReferenceKey, Vec<WordBoundary>>>,
}

impl InMemoryTimingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WordTimingStore for InMemoryTimingStore {
    fn get(&self, key: &ReferenceKey) -> Result<Option<Vec<WordBoundary>>, ScoringError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| ScoringError::store(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &ReferenceKey, words: &[WordBoundary]) -> Result<(), ScoringError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| ScoringError::store(e.to_string()))?;
        entries.insert(key.clone(), words.to_vec());
        Ok(())
    }
}

/// One pretty-printed JSON file per key under `dir`.
#[derive(Debug, Clone)]
pub struct JsonFileTimingStore {
    dir: PathBuf,
}

impl JsonFileTimingStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &ReferenceKey) -> Result<PathBuf, ScoringError> {
        Ok(self.dir.join(format!("{}.json", key.file_stem()?)))
    }

    /// Deletes every cached timing file and returns how many were removed.
    pub fn clear(&self) -> Result<usize, ScoringError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(ScoringError::io("list word timing cache", e)),
        };
        let mut removed = 0;
        for entry in entries {
            let path = entry
                .map_err(|e| ScoringError::io("list word timing cache", e))?
                .path();
            if path.extension().is_some_and(|ext| ext == "json") {
                std::fs::remove_file(&path)
                    .map_err(|e| ScoringError::io("remove cached word timings", e))?;
                removed += 1;
            }
        }
        tracing::debug!(dir = %self.dir.display(), removed, "timing cache: cleared");
        Ok(removed)
    }
}

impl WordTimingStore for JsonFileTimingStore {
    fn get(&self, key: &ReferenceKey) -> Result<Option<Vec<WordBoundary>>, ScoringError> {
        let path = self.path_for(key)?;
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ScoringError::io("read cached word timings", e)),
        };
        let words = serde_json::from_str(&data)
            .map_err(|e| ScoringError::json("parse cached word timings", e))?;
        Ok(Some(words))
    }

    fn put(&self, key: &ReferenceKey, words: &[WordBoundary]) -> Result<(), ScoringError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| ScoringError::io("create word timing cache dir", e))?;
        let data = serde_json::to_string_pretty(words)
            .map_err(|e| ScoringError::json("serialize word timings", e))?;
        std::fs::write(&path, data).map_err(|e| ScoringError::io("write cached word timings", e))
    }
}

/// Store-first word-timing lookup with load-on-miss and write-through.
pub struct CachedTimingSource {
    store: Box<dyn WordTimingStore>,
    loader: Box<dyn WordTimingLoader>,
}

impl CachedTimingSource {
    pub fn new(store: Box<dyn WordTimingStore>, loader: Box<dyn WordTimingLoader>) -> Self {
        Self { store, loader }
    }

    /// Word boundaries for `key`, empty when neither the store nor the loader
    /// has them. Loader misses are not cached, so a later call retries the
    /// loader. A failed write-through is logged and the loaded words are still
    /// returned.
    pub fn words(&self, key: &ReferenceKey) -> Result<Vec<WordBoundary>, ScoringError> {
        if let Some(words) = self.store.get(key)? {
            tracing::debug!(%key, words = words.len(), "timing cache: hit");
            return Ok(words);
        }

        let Some(words) = self.loader.load(key)? else {
            tracing::debug!(%key, "timing cache: source has no timings");
            return Ok(Vec::new());
        };

        if let Err(err) = self.store.put(key, &words) {
            tracing::warn!(%key, error = %err, "timing cache: write-through failed");
        } else {
            tracing::debug!(%key, words = words.len(), "timing cache: stored");
        }
        Ok(words)
    }
}
