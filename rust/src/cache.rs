//! Incremental analysis cache.
//!
//! Entries are keyed by [`content_hash`](crate::parser::util::content_hash), so
//! an unchanged file is never parsed or summarized twice. The cache can be
//! persisted as a single JSON file and reloaded on the next start.

use crate::error::StoreResult;
use crate::parser::CodeStructure;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAnalysis {
    pub structure: CodeStructure,
    /// Summaries keyed by qualified name; `None` when never requested.
    pub summaries: Option<BTreeMap<String, String>>,
    pub cached_at: DateTime<Utc>,
}

impl CachedAnalysis {
    pub fn new(structure: CodeStructure, summaries: Option<BTreeMap<String, String>>) -> Self {
        Self {
            structure,
            summaries,
            cached_at: Utc::now(),
        }
    }
}

pub struct AnalysisCache {
    entries: DashMap<String, CachedAnalysis>,
    path: Option<PathBuf>,
    write_lock: Mutex<()>,
}

impl AnalysisCache {
    pub fn in_memory() -> Self {
        Self {
            entries: DashMap::new(),
            path: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Open a file-backed cache. A missing file starts empty.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = DashMap::new();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let stored: BTreeMap<String, CachedAnalysis> = serde_json::from_str(&content)?;
            debug!("Loaded {} cached analyses from {}", stored.len(), path.display());
            for (key, value) in stored {
                entries.insert(key, value);
            }
        }
        Ok(Self {
            entries,
            path: Some(path),
            write_lock: Mutex::new(()),
        })
    }

    pub fn get(&self, key: &str) -> Option<CachedAnalysis> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    /// Entry for `key`, only if it can serve a request that does or does not
    /// need summaries.
    pub fn lookup(&self, key: &str, need_summaries: bool) -> Option<CachedAnalysis> {
        self.get(key)
            .filter(|entry| !need_summaries || entry.summaries.is_some())
    }

    pub fn insert(&self, key: String, value: CachedAnalysis) {
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the cache to its file, if it has one.
    pub fn persist(&self) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        // Snapshot under the lock so a later writer never saves older state.
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let snapshot: BTreeMap<String, CachedAnalysis> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string(&snapshot)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
