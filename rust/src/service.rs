//! The analysis pipeline shared by the HTTP server and the CLI.
//!
//! bytes → content hash → cache lookup → parse → summarize → cache → history.

use crate::cache::{AnalysisCache, CachedAnalysis};
use crate::error::{ParseError, ServiceError, ServiceResult};
use crate::history::{AnalysisRecord, HistoryStore, RecordSource};
use crate::parser::util::{content_hash, lines_between};
use crate::parser::{parse_source, CodeStructure, Language};
use crate::summarizer::{summarize_code_snippet, Snippet, Summarizer, ERROR_PREFIX};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub summarize: bool,
    /// Where to attribute the history record; `None` skips history.
    pub record: Option<RecordSource>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub filename: String,
    pub content_hash: String,
    pub cached: bool,
    pub structure: CodeStructure,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summaries: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

pub struct Analyzer {
    cache: Arc<AnalysisCache>,
    history: Option<Arc<HistoryStore>>,
    summarizer: Arc<dyn Summarizer>,
}

impl Analyzer {
    pub fn new(cache: AnalysisCache, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            cache: Arc::new(cache),
            history: None,
            summarizer,
        }
    }

    pub fn with_history(mut self, history: HistoryStore) -> Self {
        self.history = Some(Arc::new(history));
        self
    }

    pub fn history(&self) -> Option<&HistoryStore> {
        self.history.as_deref()
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    /// Analyze one file. The language is taken from `filename`'s extension.
    pub async fn analyze(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        options: &AnalyzeOptions,
    ) -> ServiceResult<Analysis> {
        let language = Language::from_path(Path::new(filename))
            .ok_or_else(|| ParseError::UnsupportedLanguage(filename.to_string()))?;
        let source =
            String::from_utf8(bytes).map_err(|e| ServiceError::InvalidEncoding(e.to_string()))?;
        let key = content_hash(language, &source);

        if let Some(hit) = self.cache.lookup(&key, options.summarize) {
            debug!("Cache hit for {} ({})", filename, &key[..12]);
            let summaries = if options.summarize { hit.summaries } else { None };
            return Ok(self
                .finish(filename, key, true, hit.structure, summaries, options)
                .await);
        }

        let (structure, source) = tokio::task::spawn_blocking(move || {
            parse_source(language, &source).map(|structure| (structure, source))
        })
        .await
        .map_err(|e| ServiceError::Task(e.to_string()))??;

        let summaries = if options.summarize {
            Some(self.summarize_all(&structure, &source).await)
        } else {
            None
        };

        let failed = summaries
            .as_ref()
            .is_some_and(|m| m.values().any(|s| s.starts_with(ERROR_PREFIX)));
        let cached_summaries = if failed { None } else { summaries.clone() };
        self.cache.insert(
            key.clone(),
            CachedAnalysis::new(structure.clone(), cached_summaries),
        );
        self.persist_cache().await;

        info!(
            "Analyzed {}: {} functions, {} classes",
            filename,
            structure.functions.len(),
            structure.classes.len()
        );
        Ok(self
            .finish(filename, key, false, structure, summaries, options)
            .await)
    }

    /// Write the cache file off the async workers. Failures are logged; the
    /// in-memory entry still serves later requests.
    async fn persist_cache(&self) {
        let cache = Arc::clone(&self.cache);
        match tokio::task::spawn_blocking(move || cache.persist()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to persist analysis cache: {}", e),
            Err(e) => warn!("Cache persist task failed: {}", e),
        }
    }

    async fn summarize_all(&self, structure: &CodeStructure, source: &str) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        for symbol in structure.callables() {
            let code = lines_between(source, symbol.start_line, symbol.end_line);
            let snippet = Snippet {
                language: structure.language,
                code: &code,
                symbol,
            };
            let summary = summarize_code_snippet(self.summarizer.as_ref(), &snippet).await;
            out.insert(symbol.qualified_name.clone(), summary);
        }
        out
    }

    async fn finish(
        &self,
        filename: &str,
        content_hash: String,
        cached: bool,
        structure: CodeStructure,
        summaries: Option<BTreeMap<String, String>>,
        options: &AnalyzeOptions,
    ) -> Analysis {
        let record_id = match (&self.history, options.record) {
            (Some(history), Some(source)) => {
                let record = AnalysisRecord::new(filename, content_hash.as_str(), &structure, source);
                let history = Arc::clone(history);
                match tokio::task::spawn_blocking(move || history.save(&record).map(|()| record.id)).await {
                    Ok(Ok(id)) => Some(id),
                    Ok(Err(e)) => {
                        warn!("Failed to save history record for {}: {}", filename, e);
                        None
                    }
                    Err(e) => {
                        warn!("History task failed for {}: {}", filename, e);
                        None
                    }
                }
            }
            _ => None,
        };
        Analysis {
            filename: filename.to_string(),
            content_hash,
            cached,
            structure,
            summaries,
            record_id,
        }
    }
}
