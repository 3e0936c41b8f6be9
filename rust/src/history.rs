//! Analysis history.
//!
//! Stores each analysis as a separate JSON file under the data directory.

use crate::error::{StoreError, StoreResult};
use crate::parser::{CodeStructure, Language};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    Upload,
    Cli,
}

/// A persisted analysis record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Short identifier (8 hex characters).
    pub id: String,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub content_hash: String,
    pub language: Language,
    pub function_count: usize,
    pub class_count: usize,
    pub source: RecordSource,
}

impl AnalysisRecord {
    pub fn new(
        filename: impl Into<String>,
        content_hash: impl Into<String>,
        structure: &CodeStructure,
        source: RecordSource,
    ) -> Self {
        let id = Uuid::new_v4().simple().to_string()[..8].to_string();
        Self {
            id,
            filename: filename.into(),
            uploaded_at: Utc::now(),
            content_hash: content_hash.into(),
            language: structure.language,
            function_count: structure.functions.len(),
            class_count: structure.classes.len(),
            source,
        }
    }
}

pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn save(&self, record: &AnalysisRecord) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(record)?;
        fs::write(self.record_file(&record.id), content)?;
        Ok(())
    }

    pub fn load(&self, id: &str) -> StoreResult<AnalysisRecord> {
        if !is_valid_id(id) {
            return Err(StoreError::RecordNotFound(id.to_string()));
        }
        let file = self.record_file(id);
        if !file.exists() {
            return Err(StoreError::RecordNotFound(id.to_string()));
        }
        let content = fs::read_to_string(&file)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// All records, newest first. Unreadable files are skipped.
    pub fn list(&self) -> StoreResult<Vec<AnalysisRecord>> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .map_err(StoreError::from)
                .and_then(|c| serde_json::from_str::<AnalysisRecord>(&c).map_err(StoreError::from));
            match parsed {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping history file {}: {}", path.display(), e),
            }
        }
        records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(records)
    }

    fn record_file(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 32 && id.chars().all(|c| c.is_ascii_hexdigit())
}
